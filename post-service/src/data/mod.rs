pub mod like_repository;
pub mod memory;
pub mod post_repository;
pub mod post_share_repository;

pub use like_repository::{LikeRepository, PostgresLikeRepository};
pub use memory::InMemoryStore;
pub use post_repository::{PostRepository, PostgresPostRepository};
pub use post_share_repository::{PostShareRepository, PostgresPostShareRepository};

use crate::domain::DomainError;

/// Maps an insert failure, turning a unique violation into `conflict`.
pub(crate) fn map_insert_error(err: sqlx::Error, conflict: DomainError) -> DomainError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            tracing::warn!("Unique constraint rejected insert: {}", db);
            conflict
        }
        _ => DomainError::DatabaseError(err.to_string()),
    }
}
