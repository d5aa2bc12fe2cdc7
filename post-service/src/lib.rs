pub mod application;
pub mod data;
pub mod domain;
pub mod infrastructure;

pub use application::PostInteractionService;
pub use domain::DomainError;

use data::{PostgresLikeRepository, PostgresPostRepository, PostgresPostShareRepository};
use infrastructure::{config::AppConfig, database::create_pool, logging::init_logging};
use std::sync::Arc;

/// Opens the connection pool and wires the Postgres repositories into a service.
pub async fn connect(config: &AppConfig) -> anyhow::Result<PostInteractionService> {
    tracing::info!("Connecting to database...");
    let pool = create_pool(config).await?;

    let post_repo = Arc::new(PostgresPostRepository::new(pool.clone()));
    let share_repo = Arc::new(PostgresPostShareRepository::new(pool.clone()));
    let like_repo = Arc::new(PostgresLikeRepository::new(pool));

    tracing::info!("Post interaction service initialized");

    Ok(PostInteractionService::new(post_repo, share_repo, like_repo))
}

/// Installs logging from `config`, then [`connect`]s.
pub async fn start(config: &AppConfig) -> anyhow::Result<PostInteractionService> {
    init_logging(config);
    connect(config).await
}
