use anyhow::{anyhow, Context, Result};

use crate::generation::audit::AuditPolicy;
use crate::llm_client::DEFAULT_API_BASE;

/// Where users, profiles and the audit log live.
#[derive(Clone)]
pub enum StoreConfig {
    /// Hosted REST API (PostgREST) with a service-role key.
    Rest { url: String, service_key: String },
    /// Direct Postgres connection.
    Postgres { database_url: String },
}

/// Application configuration loaded from environment variables.
/// Startup fails if no store is configured or a value does not parse.
#[derive(Clone)]
pub struct Config {
    pub store: StoreConfig,
    /// Optional at startup; generation endpoints answer 500 without it.
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub audit_policy: AuditPolicy,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Empty values count as unset.
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let store = match var("DATABASE_URL") {
            Some(database_url) => StoreConfig::Postgres { database_url },
            None => match (var("SUPABASE_URL"), var("SUPABASE_SERVICE_ROLE_KEY")) {
                (Some(url), Some(service_key)) => StoreConfig::Rest { url, service_key },
                _ => {
                    return Err(anyhow!(
                        "SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY must be set (or DATABASE_URL)"
                    ))
                }
            },
        };

        let audit_policy = match var("AUDIT_MODE") {
            Some(mode) => mode.parse::<AuditPolicy>().map_err(|e| anyhow!(e))?,
            None => AuditPolicy::default(),
        };

        Ok(Config {
            store,
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_api_base: var("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            audit_policy,
            port: var("PORT")
                .unwrap_or_else(|| "3001".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
