use crate::domain::{Comment, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Active,
    Deleted,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "deleted" => Ok(Self::Deleted),
            other => Err(format!("unknown post status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    /// Present when the author relation was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    pub comments: Vec<Comment>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Builds an unsaved post owned by `author`. The store assigns the id.
    pub fn new(title: String, content: String, author: &User) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title,
            content,
            author_id: author.id,
            author: Some(author.clone()),
            comments: Vec::new(),
            status: PostStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == PostStatus::Active
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl UpdatePostRequest {
    /// Shallow merge of the supplied fields into `post`.
    ///
    /// Returns `true` when at least one field was supplied. The author is
    /// never reassigned.
    pub fn apply_to(self, post: &mut Post) -> bool {
        let mut changed = false;

        if let Some(title) = self.title {
            post.title = title;
            changed = true;
        }
        if let Some(content) = self.content {
            post.content = content;
            changed = true;
        }

        if changed {
            post.updated_at = Utc::now();
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> User {
        User {
            id: 3,
            username: "alice".into(),
            email: "alice@example.com".into(),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn new_post_is_active_and_bound_to_author() {
        let post = Post::new("Hello".into(), "World".into(), &author());
        assert_eq!(post.author_id, 3);
        assert_eq!(post.author, Some(author()));
        assert!(post.is_active());
        assert!(post.comments.is_empty());
    }

    #[test]
    fn apply_to_touches_only_supplied_fields() {
        let mut post = Post::new("Hello".into(), "World".into(), &author());
        let before = post.clone();

        let changed = UpdatePostRequest {
            title: Some("Bonjour".into()),
            content: None,
        }
        .apply_to(&mut post);

        assert!(changed);
        assert_eq!(post.title, "Bonjour");
        assert_eq!(post.content, before.content);
        assert_eq!(post.author_id, before.author_id);
        assert!(post.updated_at >= before.updated_at);
    }

    #[test]
    fn empty_update_changes_nothing() {
        let mut post = Post::new("Hello".into(), "World".into(), &author());
        let before = post.clone();

        assert!(!UpdatePostRequest::default().apply_to(&mut post));
        assert_eq!(post, before);
    }

    #[test]
    fn status_round_trips_through_text() {
        assert_eq!("deleted".parse::<PostStatus>(), Ok(PostStatus::Deleted));
        assert_eq!(PostStatus::Active.to_string(), "active");
        assert!("archived".parse::<PostStatus>().is_err());
    }
}
