//! Direct Postgres backend, used when `DATABASE_URL` is configured.
//!
//! Expects the same three tables the REST API exposes: `users`, `user_profiles`
//! (FK `user_id` → `users.id`) and `generated_content`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;

use super::{Store, StoreError};
use crate::models::content::GeneratedContentRecord;
use crate::models::profile::{placeholder_email, ProfileRecord, UserProfile};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates the connection pool.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT COALESCE(interests, '{}') AS interests,
                   COALESCE(profession, '') AS profession,
                   COALESCE(hobbies, '{}') AS hobbies,
                   COALESCE(preferred_content_themes, '{}') AS preferred_content_themes
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn upsert_profile(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> Result<ProfileRecord, StoreError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Parent row first: user_profiles.user_id references users.id
        sqlx::query(
            r#"
            INSERT INTO users (id, email, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(placeholder_email(user_id))
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::DependencyWrite(e.to_string()))?;

        let record = sqlx::query_as::<_, ProfileRecord>(
            r#"
            INSERT INTO user_profiles
                (user_id, interests, profession, hobbies, preferred_content_themes, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                interests = EXCLUDED.interests,
                profession = EXCLUDED.profession,
                hobbies = EXCLUDED.hobbies,
                preferred_content_themes = EXCLUDED.preferred_content_themes,
                updated_at = EXCLUDED.updated_at
            RETURNING user_id, interests, profession, hobbies, preferred_content_themes, updated_at
            "#,
        )
        .bind(user_id)
        .bind(profile.interests.as_slice())
        .bind(&profile.profession)
        .bind(profile.hobbies.as_slice())
        .bind(profile.preferred_content_themes.as_slice())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn insert_generated_content(
        &self,
        record: &GeneratedContentRecord,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO generated_content (user_id, prompt_text, generated_response)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(record.user_id.as_deref())
        .bind(&record.prompt_text)
        .bind(Json(&record.generated_response))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT user_id FROM user_profiles LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(())
    }
}
