use std::sync::Arc;

use crate::generation::audit::AuditLog;
use crate::llm_client::ContentProvider;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Users, profiles and the audit log. REST or direct Postgres, chosen at startup.
    pub store: Arc<dyn Store>,
    /// `None` when no provider key is configured; generation endpoints answer 500.
    pub llm: Option<Arc<dyn ContentProvider>>,
    pub audit: AuditLog,
}
