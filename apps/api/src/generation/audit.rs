//! Audit log for generated content. Audit failures never fail a generation; the
//! policy only decides whether the caller waits for the write and hears about it.

use std::str::FromStr;
use std::sync::Arc;

use tracing::warn;

use crate::models::content::GeneratedContentRecord;
use crate::store::Store;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuditPolicy {
    /// Spawn the write and return immediately; failures are only logged.
    #[default]
    Background,
    /// Wait for the write; failures are only logged.
    Await,
    /// Wait for the write and hand failures back to the caller.
    Report,
}

impl FromStr for AuditPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "background" => Ok(AuditPolicy::Background),
            "await" => Ok(AuditPolicy::Await),
            "report" => Ok(AuditPolicy::Report),
            other => Err(format!(
                "unknown audit mode '{other}' (expected background, await or report)"
            )),
        }
    }
}

#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn Store>,
    policy: AuditPolicy,
}

impl AuditLog {
    pub fn new(store: Arc<dyn Store>, policy: AuditPolicy) -> Self {
        Self { store, policy }
    }

    /// Persists `record` according to the policy. Returns the failure text only
    /// under `AuditPolicy::Report`.
    pub async fn record(&self, record: GeneratedContentRecord) -> Option<String> {
        match self.policy {
            AuditPolicy::Background => {
                let store = Arc::clone(&self.store);
                tokio::spawn(async move {
                    if let Err(e) = store.insert_generated_content(&record).await {
                        warn!("Background audit write failed: {e}");
                    }
                });
                None
            }
            AuditPolicy::Await => {
                if let Err(e) = self.store.insert_generated_content(&record).await {
                    warn!("Audit write failed: {e}");
                }
                None
            }
            AuditPolicy::Report => match self.store.insert_generated_content(&record).await {
                Ok(()) => None,
                Err(e) => {
                    warn!("Audit write failed, reporting to caller: {e}");
                    Some(e.to_string())
                }
            },
        }
    }
}
