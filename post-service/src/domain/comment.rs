use crate::domain::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment owned by a post. Fetched only through the post's relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
