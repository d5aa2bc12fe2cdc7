pub mod post_service;

pub use post_service::PostInteractionService;
