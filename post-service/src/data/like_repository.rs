use super::map_insert_error;
use crate::domain::{DomainError, Like};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait LikeRepository: Send + Sync {
    async fn find_by_post_and_user(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<Like>, DomainError>;
    async fn find_by_post(&self, post_id: i64) -> Result<Vec<Like>, DomainError>;
    async fn insert(&self, like: Like) -> Result<Like, DomainError>;
    /// Physically deletes the like.
    async fn remove(&self, id: i64) -> Result<(), DomainError>;
}

pub struct PostgresLikeRepository {
    pool: PgPool,
}

impl PostgresLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn like_from_row(row: &PgRow) -> Result<Like, DomainError> {
    Ok(Like {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl LikeRepository for PostgresLikeRepository {
    async fn find_by_post_and_user(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<Like>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, post_id, user_id, created_at
            FROM likes
            WHERE post_id = $1 AND user_id = $2
            LIMIT 1
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        row.as_ref().map(like_from_row).transpose()
    }

    async fn find_by_post(&self, post_id: i64) -> Result<Vec<Like>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, post_id, user_id, created_at
            FROM likes
            WHERE post_id = $1
            ORDER BY id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.iter().map(like_from_row).collect()
    }

    async fn insert(&self, mut like: Like) -> Result<Like, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO likes (post_id, user_id, created_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(like.post_id)
        .bind(like.user_id)
        .bind(like.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, DomainError::AlreadyLiked))?;

        like.id = row.try_get("id")?;
        Ok(like)
    }

    async fn remove(&self, id: i64) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM likes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
