use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Post with ID {0} not found")]
    PostNotFound(i64),

    #[error("User has already shared this post")]
    AlreadyShared,

    #[error("User has already liked this post")]
    AlreadyLiked,

    /// Store write failed. The original cause is logged, never carried.
    #[error("{0}")]
    Persistence(&'static str),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl DomainError {
    pub fn to_status_code(&self) -> u16 {
        match self {
            Self::PostNotFound(_) => 404,
            Self::AlreadyShared | Self::AlreadyLiked => 409,
            Self::Persistence(_) | Self::DatabaseError(_) => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PostNotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyShared | Self::AlreadyLiked)
    }

    /// JSON body for the HTTP layer. Server errors get a generic message.
    pub fn to_error_body(&self) -> serde_json::Value {
        let message = match self.to_status_code() {
            500 => "Internal server error".to_string(),
            _ => self.to_string(),
        };
        serde_json::json!({ "error": message })
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}
