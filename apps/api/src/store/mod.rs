//! Store — the hosted database holding users, profiles and the generation audit log.
//!
//! Two backends implement `Store`: `RestStore` (PostgREST over HTTP, the default) and
//! `PgStore` (direct Postgres via sqlx). The database is the single source of truth;
//! nothing here caches.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::content::GeneratedContentRecord;
use crate::models::profile::{ProfileRecord, UserProfile};

pub mod postgres;
pub mod rest;

pub use postgres::PgStore;
pub use rest::RestStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The parent `users` row could not be written, so the profile write was skipped.
    #[error("Failed to create or update user entry: {0}")]
    DependencyWrite(String),

    #[error("Store returned no {0} row")]
    MissingRow(&'static str),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// `Ok(None)` when the user has no profile row.
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Ensures the parent user row exists, then replaces the profile wholesale.
    async fn upsert_profile(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> Result<ProfileRecord, StoreError>;

    async fn insert_generated_content(
        &self,
        record: &GeneratedContentRecord,
    ) -> Result<(), StoreError>;

    /// Cheap read used as the startup connectivity probe.
    async fn ping(&self) -> Result<(), StoreError>;
}
