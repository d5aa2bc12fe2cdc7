use super::map_insert_error;
use super::post_repository::{attach_comments, post_from_row, POST_COLUMNS};
use crate::domain::{DomainError, PostRelations, PostShare, SortOrder};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait PostShareRepository: Send + Sync {
    async fn find_by_post_and_user(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<PostShare>, DomainError>;
    /// Shares made by `user_id` ordered by `shared_at`.
    ///
    /// With `post_relations` set, each share carries its post when that post
    /// is still active.
    async fn find_by_user(
        &self,
        user_id: i64,
        order: SortOrder,
        post_relations: Option<PostRelations>,
    ) -> Result<Vec<PostShare>, DomainError>;
    async fn insert(&self, share: PostShare) -> Result<PostShare, DomainError>;
}

pub struct PostgresPostShareRepository {
    pool: PgPool,
}

impl PostgresPostShareRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn share_from_row(row: &PgRow) -> Result<PostShare, DomainError> {
    Ok(PostShare {
        id: row.try_get("share_id")?,
        post_id: row.try_get("share_post_id")?,
        user_id: row.try_get("share_user_id")?,
        shared_at: row.try_get("shared_at")?,
        post: None,
    })
}

#[async_trait]
impl PostShareRepository for PostgresPostShareRepository {
    async fn find_by_post_and_user(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<PostShare>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id AS share_id, post_id AS share_post_id, user_id AS share_user_id, shared_at
            FROM post_shares
            WHERE post_id = $1 AND user_id = $2
            LIMIT 1
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        row.as_ref().map(share_from_row).transpose()
    }

    async fn find_by_user(
        &self,
        user_id: i64,
        order: SortOrder,
        post_relations: Option<PostRelations>,
    ) -> Result<Vec<PostShare>, DomainError> {
        let direction = order.as_sql();
        let sql = match post_relations {
            Some(_) => format!(
                r#"
                SELECT s.id AS share_id, s.post_id AS share_post_id,
                       s.user_id AS share_user_id, s.shared_at,
                       {POST_COLUMNS}
                FROM post_shares s
                LEFT JOIN posts p ON p.id = s.post_id AND p.status = 'active'
                LEFT JOIN users u ON u.id = p.author_id
                WHERE s.user_id = $1
                ORDER BY s.shared_at {direction}, s.id {direction}
                "#
            ),
            None => format!(
                r#"
                SELECT id AS share_id, post_id AS share_post_id,
                       user_id AS share_user_id, shared_at
                FROM post_shares
                WHERE user_id = $1
                ORDER BY shared_at {direction}, id {direction}
                "#
            ),
        };

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        let mut shares = Vec::with_capacity(rows.len());
        let mut slots = Vec::new();
        let mut posts = Vec::new();

        for row in &rows {
            let share = share_from_row(row)?;
            if let Some(relations) = post_relations {
                let visible: Option<i64> = row.try_get("post_id")?;
                if visible.is_some() {
                    slots.push(shares.len());
                    posts.push(post_from_row(row, relations)?);
                }
            }
            shares.push(share);
        }

        if let Some(relations) = post_relations {
            attach_comments(&self.pool, &mut posts, relations).await?;
        }

        for (slot, post) in slots.into_iter().zip(posts) {
            shares[slot].post = Some(post);
        }

        Ok(shares)
    }

    async fn insert(&self, mut share: PostShare) -> Result<PostShare, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO post_shares (post_id, user_id, shared_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(share.post_id)
        .bind(share.user_id)
        .bind(share.shared_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, DomainError::AlreadyShared))?;

        share.id = row.try_get("id")?;
        Ok(share)
    }
}
