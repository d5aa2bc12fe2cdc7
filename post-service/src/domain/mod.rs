pub mod comment;
pub mod error;
pub mod like;
pub mod post;
pub mod post_share;
pub mod query;
pub mod user;

pub use comment::Comment;
pub use error::DomainError;
pub use like::Like;
pub use post::{CreatePostRequest, Post, PostStatus, UpdatePostRequest};
pub use post_share::PostShare;
pub use query::{PostRelations, SortOrder};
pub use user::User;
