use anyhow::{Context, Result};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LOG_FILTER: &str = "info,post_service=debug";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    /// `tracing` filter directives, used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl AppConfig {
    /// Reads configuration from the environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let log_filter = std::env::var("POST_SERVICE_LOG")
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            database_url,
            database_max_connections,
            log_filter,
        })
    }
}
