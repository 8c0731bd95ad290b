//! In-process stand-ins for the store and the provider, used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;

use crate::generation::audit::{AuditLog, AuditPolicy};
use crate::llm_client::{ContentProvider, LlmError};
use crate::models::content::{GeneratedContentRecord, GeneratedImage};
use crate::models::profile::{ProfileRecord, UserProfile};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{Store, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashSet<String>>,
    profiles: Mutex<HashMap<String, ProfileRecord>>,
    records: Mutex<Vec<GeneratedContentRecord>>,
    fail_user_writes: bool,
    fail_audit_writes: bool,
}

impl MemoryStore {
    pub fn failing_user_writes() -> Self {
        Self {
            fail_user_writes: true,
            ..Default::default()
        }
    }

    pub fn failing_audit() -> Self {
        Self {
            fail_audit_writes: true,
            ..Default::default()
        }
    }

    pub fn records(&self) -> Vec<GeneratedContentRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn has_user(&self, user_id: &str) -> bool {
        self.users.lock().unwrap().contains(user_id)
    }

    pub fn has_profile(&self, user_id: &str) -> bool {
        self.profiles.lock().unwrap().contains_key(user_id)
    }
}

fn unavailable(what: &str) -> StoreError {
    StoreError::Api {
        status: 503,
        code: None,
        message: format!("{what} unavailable"),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .get(user_id)
            .map(|record| record.profile.clone()))
    }

    async fn upsert_profile(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> Result<ProfileRecord, StoreError> {
        if self.fail_user_writes {
            return Err(StoreError::DependencyWrite(
                unavailable("users table").to_string(),
            ));
        }
        self.users.lock().unwrap().insert(user_id.to_string());

        let record = ProfileRecord {
            user_id: user_id.to_string(),
            profile: profile.clone(),
            updated_at: Some(chrono::Utc::now()),
        };
        self.profiles
            .lock()
            .unwrap()
            .insert(user_id.to_string(), record.clone());
        Ok(record)
    }

    async fn insert_generated_content(
        &self,
        record: &GeneratedContentRecord,
    ) -> Result<(), StoreError> {
        if self.fail_audit_writes {
            return Err(unavailable("audit log"));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Echoes `"<prompt>@t=<temperature>"`. Optionally fails at one temperature.
#[derive(Default)]
pub struct EchoProvider {
    fail_at: Option<f32>,
    image: Option<GeneratedImage>,
    calls: AtomicUsize,
}

impl EchoProvider {
    pub fn failing_at(temperature: f32) -> Self {
        Self {
            fail_at: Some(temperature),
            ..Default::default()
        }
    }

    pub fn with_image(mime_type: &str, data: &str) -> Self {
        Self {
            image: Some(GeneratedImage {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            }),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentProvider for EchoProvider {
    async fn generate_text(
        &self,
        prompt: &str,
        _profile: &UserProfile,
        temperature: f32,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(temperature) {
            return Err(LlmError::Generation(format!(
                "quota exceeded at t={temperature}"
            )));
        }
        Ok(format!("{prompt}@t={temperature}"))
    }

    async fn generate_image(&self, _prompt: &str) -> Result<GeneratedImage, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.image.clone().ok_or(LlmError::NoImageData)
    }
}

/// Router wired to the given stand-ins, with awaited audit writes so tests can
/// inspect the store right after a response.
pub fn test_router(store: Arc<MemoryStore>, llm: Option<Arc<EchoProvider>>) -> Router {
    let state = AppState {
        store: store.clone(),
        llm: llm.map(|llm| llm as Arc<dyn ContentProvider>),
        audit: AuditLog::new(store, AuditPolicy::Await),
    };
    build_router(state)
}
