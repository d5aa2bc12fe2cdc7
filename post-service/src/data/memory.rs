//! In-memory store implementing every repository trait.
//!
//! Mirrors the Postgres repositories closely enough to back the test suite
//! and local experiments. Data is lost when the store is dropped.

use super::{LikeRepository, PostRepository, PostShareRepository};
use crate::domain::{
    Comment, DomainError, Like, Post, PostRelations, PostShare, PostStatus, SortOrder, User,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: HashMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    comments: Vec<Comment>,
    shares: Vec<PostShare>,
    likes: Vec<Like>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// Copy of a stored post with the requested relations attached.
    fn load_post(&self, stored: &Post, relations: PostRelations) -> Post {
        let mut post = stored.clone();

        if relations.author {
            post.author = self.users.get(&post.author_id).cloned();
        }

        if relations.comments {
            post.comments = self
                .comments
                .iter()
                .filter(|c| c.post_id == post.id)
                .map(|c| {
                    let mut comment = c.clone();
                    if relations.comment_authors {
                        comment.author = self.users.get(&comment.author_id).cloned();
                    }
                    comment
                })
                .collect();
        }

        post
    }
}

pub struct InMemoryStore {
    tables: RwLock<Tables>,
    unique_pairs: bool,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            unique_pairs: false,
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Store that rejects a second share or like for the same (post, user)
    /// pair, like a `UNIQUE (post_id, user_id)` constraint would.
    pub fn with_unique_constraints() -> Self {
        Self {
            unique_pairs: true,
            ..Self::new()
        }
    }

    /// Makes every subsequent write fail until switched off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError(
                "simulated write failure".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn add_user(&self, username: &str, email: &str) -> User {
        let mut tables = self.tables.write().await;
        let user = User {
            id: tables.next_id(),
            username: username.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        user
    }

    pub async fn add_comment(&self, post_id: i64, author_id: i64, body: &str) -> Comment {
        let mut tables = self.tables.write().await;
        let comment = Comment {
            id: tables.next_id(),
            post_id,
            author_id,
            author: None,
            body: body.to_string(),
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());
        comment
    }

    /// Stored row regardless of status, without relations.
    pub async fn raw_post(&self, id: i64) -> Option<Post> {
        self.tables.read().await.posts.get(&id).cloned()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn insert(&self, mut post: Post) -> Result<Post, DomainError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        post.id = tables.next_id();

        let mut stored = post.clone();
        stored.author = None;
        stored.comments.clear();
        tables.posts.insert(stored.id, stored);

        Ok(post)
    }

    async fn find_all(&self, relations: PostRelations) -> Result<Vec<Post>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .filter(|p| p.is_active())
            .map(|p| tables.load_post(p, relations))
            .collect())
    }

    async fn find_by_id(
        &self,
        id: i64,
        relations: PostRelations,
    ) -> Result<Option<Post>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .get(&id)
            .filter(|p| p.is_active())
            .map(|p| tables.load_post(p, relations)))
    }

    async fn save(&self, post: Post) -> Result<Post, DomainError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        match tables.posts.get_mut(&post.id) {
            Some(stored) if stored.is_active() => {
                stored.title = post.title.clone();
                stored.content = post.content.clone();
                stored.updated_at = post.updated_at;
                Ok(post)
            }
            _ => Err(DomainError::PostNotFound(post.id)),
        }
    }

    async fn soft_remove(&self, id: i64) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        match tables.posts.get_mut(&id) {
            Some(stored) if stored.is_active() => {
                stored.status = PostStatus::Deleted;
                stored.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(DomainError::PostNotFound(id)),
        }
    }
}

#[async_trait]
impl PostShareRepository for InMemoryStore {
    async fn find_by_post_and_user(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<PostShare>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .shares
            .iter()
            .find(|s| s.post_id == post_id && s.user_id == user_id)
            .cloned())
    }

    async fn find_by_user(
        &self,
        user_id: i64,
        order: SortOrder,
        post_relations: Option<PostRelations>,
    ) -> Result<Vec<PostShare>, DomainError> {
        let tables = self.tables.read().await;

        let mut shares: Vec<PostShare> = tables
            .shares
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();

        shares.sort_by(|a, b| (a.shared_at, a.id).cmp(&(b.shared_at, b.id)));
        if order == SortOrder::Desc {
            shares.reverse();
        }

        if let Some(relations) = post_relations {
            for share in &mut shares {
                share.post = tables
                    .posts
                    .get(&share.post_id)
                    .filter(|p| p.is_active())
                    .map(|p| tables.load_post(p, relations));
            }
        }

        Ok(shares)
    }

    async fn insert(&self, mut share: PostShare) -> Result<PostShare, DomainError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        if self.unique_pairs
            && tables
                .shares
                .iter()
                .any(|s| s.post_id == share.post_id && s.user_id == share.user_id)
        {
            return Err(DomainError::AlreadyShared);
        }

        share.id = tables.next_id();

        let mut stored = share.clone();
        stored.post = None;
        tables.shares.push(stored);

        Ok(share)
    }
}

#[async_trait]
impl LikeRepository for InMemoryStore {
    async fn find_by_post_and_user(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<Like>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .likes
            .iter()
            .find(|l| l.post_id == post_id && l.user_id == user_id)
            .cloned())
    }

    async fn find_by_post(&self, post_id: i64) -> Result<Vec<Like>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .likes
            .iter()
            .filter(|l| l.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, mut like: Like) -> Result<Like, DomainError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;

        if self.unique_pairs
            && tables
                .likes
                .iter()
                .any(|l| l.post_id == like.post_id && l.user_id == like.user_id)
        {
            return Err(DomainError::AlreadyLiked);
        }

        like.id = tables.next_id();
        tables.likes.push(like.clone());

        Ok(like)
    }

    async fn remove(&self, id: i64) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        tables.likes.retain(|l| l.id != id);
        Ok(())
    }
}
