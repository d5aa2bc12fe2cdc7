use crate::infrastructure::config::AppConfig;
use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};

pub async fn create_pool(config: &AppConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!(
        "Database connection pool created (max_connections={})",
        config.database_max_connections
    );
    Ok(pool)
}
