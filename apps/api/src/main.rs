mod config;
mod errors;
mod generation;
mod llm_client;
mod models;
mod profile;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StoreConfig};
use crate::generation::audit::AuditLog;
use crate::llm_client::{ContentProvider, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{PgStore, RestStore, Store};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing store credentials)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PersonaPost API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize store backend and probe it before accepting traffic
    let store = build_store(&config).await?;
    info!("Attempting to connect to the store...");
    store
        .ping()
        .await
        .context("Store connectivity probe failed")?;
    info!("Store connection verified");

    // Initialize LLM client (optional: generation endpoints report the missing key)
    let llm: Option<Arc<dyn ContentProvider>> = match &config.gemini_api_key {
        Some(key) => {
            info!(
                "LLM client initialized (models: {}, {})",
                llm_client::TEXT_MODEL,
                llm_client::IMAGE_MODEL
            );
            let client = LlmClient::new(key.clone(), config.gemini_api_base.clone());
            Some(Arc::new(client) as Arc<dyn ContentProvider>)
        }
        None => {
            warn!("GEMINI_API_KEY is not set; generation endpoints will return 500");
            None
        }
    };

    info!("Audit policy: {:?}", config.audit_policy);

    // Build app state
    let state = AppState {
        audit: AuditLog::new(store.clone(), config.audit_policy),
        store,
        llm,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Direct Postgres when `DATABASE_URL` is set, otherwise the hosted REST API.
async fn build_store(config: &Config) -> Result<Arc<dyn Store>> {
    match &config.store {
        StoreConfig::Postgres { database_url } => {
            let store = PgStore::connect(database_url)
                .await
                .context("Failed to connect to PostgreSQL")?;
            Ok(Arc::new(store))
        }
        StoreConfig::Rest { url, service_key } => {
            info!("Using REST store at {url}");
            Ok(Arc::new(RestStore::new(url.clone(), service_key.clone())))
        }
    }
}
