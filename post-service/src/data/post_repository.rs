use crate::domain::{Comment, DomainError, Post, PostRelations, User};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashMap;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: Post) -> Result<Post, DomainError>;
    /// Every active post, ordered by id.
    async fn find_all(&self, relations: PostRelations) -> Result<Vec<Post>, DomainError>;
    async fn find_by_id(
        &self,
        id: i64,
        relations: PostRelations,
    ) -> Result<Option<Post>, DomainError>;
    /// Persists the post's content fields. Relations are returned untouched.
    async fn save(&self, post: Post) -> Result<Post, DomainError>;
    /// Marks the post deleted. The row is kept.
    async fn soft_remove(&self, id: i64) -> Result<(), DomainError>;
}

pub(crate) const POST_COLUMNS: &str = r#"
    p.id AS post_id, p.title, p.content, p.author_id, p.status, p.created_at, p.updated_at,
    u.username AS author_username, u.email AS author_email, u.created_at AS author_created_at
"#;

pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn post_from_row(row: &PgRow, relations: PostRelations) -> Result<Post, DomainError> {
    let author_id: i64 = row.try_get("author_id")?;
    let status: String = row.try_get("status")?;

    let author = if relations.author {
        Some(User {
            id: author_id,
            username: row.try_get("author_username")?,
            email: row.try_get("author_email")?,
            created_at: row.try_get("author_created_at")?,
        })
    } else {
        None
    };

    Ok(Post {
        id: row.try_get("post_id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        author_id,
        author,
        comments: Vec::new(),
        status: status.parse().map_err(DomainError::DatabaseError)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Loads comments for all `posts` in one query when the relations ask for them.
pub(crate) async fn attach_comments(
    pool: &PgPool,
    posts: &mut [Post],
    relations: PostRelations,
) -> Result<(), DomainError> {
    if !relations.comments || posts.is_empty() {
        return Ok(());
    }

    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();

    let rows = sqlx::query(
        r#"
        SELECT c.id, c.post_id, c.author_id, c.body, c.created_at,
               u.username AS author_username, u.email AS author_email,
               u.created_at AS author_created_at
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = ANY($1)
        ORDER BY c.id
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await
    .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

    let mut by_post: HashMap<i64, Vec<Comment>> = HashMap::new();
    for row in rows {
        let author_id: i64 = row.try_get("author_id")?;
        let author = if relations.comment_authors {
            Some(User {
                id: author_id,
                username: row.try_get("author_username")?,
                email: row.try_get("author_email")?,
                created_at: row.try_get("author_created_at")?,
            })
        } else {
            None
        };

        let comment = Comment {
            id: row.try_get("id")?,
            post_id: row.try_get("post_id")?,
            author_id,
            author,
            body: row.try_get("body")?,
            created_at: row.try_get("created_at")?,
        };
        by_post.entry(comment.post_id).or_default().push(comment);
    }

    for post in posts.iter_mut() {
        post.comments = by_post.remove(&post.id).unwrap_or_default();
    }

    Ok(())
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, mut post: Post) -> Result<Post, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO posts (title, content, author_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author_id)
        .bind(post.status.as_str())
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        post.id = row.try_get("id")?;
        Ok(post)
    }

    async fn find_all(&self, relations: PostRelations) -> Result<Vec<Post>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.status = 'active'
            ORDER BY p.id
            "#
        );

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        let mut posts = rows
            .iter()
            .map(|row| post_from_row(row, relations))
            .collect::<Result<Vec<Post>, DomainError>>()?;

        attach_comments(&self.pool, &mut posts, relations).await?;

        Ok(posts)
    }

    async fn find_by_id(
        &self,
        id: i64,
        relations: PostRelations,
    ) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.id = $1 AND p.status = 'active'
            "#
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => {
                let mut posts = vec![post_from_row(&row, relations)?];
                attach_comments(&self.pool, &mut posts, relations).await?;
                Ok(posts.pop())
            }
            None => Ok(None),
        }
    }

    async fn save(&self, post: Post) -> Result<Post, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, content = $2, updated_at = $3
            WHERE id = $4 AND status = 'active'
            RETURNING id
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.updated_at)
        .bind(post.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(_) => Ok(post),
            None => Err(DomainError::PostNotFound(post.id)),
        }
    }

    async fn soft_remove(&self, id: i64) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET status = 'deleted', updated_at = NOW()
            WHERE id = $1 AND status = 'active'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            Err(DomainError::PostNotFound(id))
        } else {
            Ok(())
        }
    }
}
