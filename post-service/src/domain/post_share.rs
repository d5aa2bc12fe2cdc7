use crate::domain::Post;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostShare {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub shared_at: DateTime<Utc>,
    /// Shared post, when loaded. `None` if not requested or no longer visible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
}

impl PostShare {
    pub fn new(post_id: i64, user_id: i64) -> Self {
        Self {
            id: 0,
            post_id,
            user_id,
            shared_at: Utc::now(),
            post: None,
        }
    }
}
