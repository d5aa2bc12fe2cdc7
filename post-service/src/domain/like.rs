use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(post_id: i64, user_id: i64) -> Self {
        Self {
            id: 0,
            post_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}
