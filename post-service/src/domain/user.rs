use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Acting or referenced user. Supplied by the identity layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
