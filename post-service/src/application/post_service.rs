use crate::data::{LikeRepository, PostRepository, PostShareRepository};
use crate::domain::{
    CreatePostRequest, DomainError, Like, Post, PostRelations, PostShare, SortOrder,
    UpdatePostRequest, User,
};
use std::sync::Arc;

/// Posts, shares and likes behind one stateless façade.
pub struct PostInteractionService {
    post_repo: Arc<dyn PostRepository + Send + Sync>,
    share_repo: Arc<dyn PostShareRepository + Send + Sync>,
    like_repo: Arc<dyn LikeRepository + Send + Sync>,
}

/// Logs a failed write and replaces it with an opaque persistence error.
/// Conflicts raised by a store constraint and rows that vanished pass through.
fn persistence_failure(err: DomainError, message: &'static str) -> DomainError {
    if err.is_conflict() || err.is_not_found() {
        return err;
    }
    tracing::error!("{}: {}", message, err);
    DomainError::Persistence(message)
}

impl PostInteractionService {
    pub fn new(
        post_repo: Arc<dyn PostRepository + Send + Sync>,
        share_repo: Arc<dyn PostShareRepository + Send + Sync>,
        like_repo: Arc<dyn LikeRepository + Send + Sync>,
    ) -> Self {
        Self {
            post_repo,
            share_repo,
            like_repo,
        }
    }

    pub async fn create(&self, req: CreatePostRequest, user: &User) -> Result<Post, DomainError> {
        tracing::debug!("Creating post for user_id={}", user.id);
        let post = Post::new(req.title, req.content, user);

        let post = self
            .post_repo
            .insert(post)
            .await
            .map_err(|e| persistence_failure(e, "Failed to create post"))?;

        tracing::info!("Post created: id={}, author_id={}", post.id, user.id);

        Ok(post)
    }

    pub async fn find_all(&self) -> Result<Vec<Post>, DomainError> {
        tracing::debug!("Listing posts");
        self.post_repo.find_all(PostRelations::FULL).await
    }

    /// Active post with author and comments. Every other lookup goes through here.
    pub async fn find_one(&self, id: i64) -> Result<Post, DomainError> {
        tracing::debug!("Getting post with id={}", id);
        match self.post_repo.find_by_id(id, PostRelations::FULL).await? {
            Some(post) => Ok(post),
            None => {
                tracing::warn!("Post {} not found", id);
                Err(DomainError::PostNotFound(id))
            }
        }
    }

    pub async fn update(&self, id: i64, req: UpdatePostRequest) -> Result<Post, DomainError> {
        tracing::debug!("Updating post id={}", id);
        let mut post = self.find_one(id).await?;

        req.apply_to(&mut post);
        let post = self.post_repo.save(post).await?;

        tracing::info!("Post updated: id={}", id);

        Ok(post)
    }

    pub async fn remove(&self, id: i64) -> Result<(), DomainError> {
        tracing::debug!("Removing post id={}", id);
        let post = self.find_one(id).await?;

        self.post_repo.soft_remove(post.id).await?;

        tracing::info!("Post soft-deleted: id={}", id);

        Ok(())
    }

    /// Re-saves the post unchanged. The like relationship itself lives in
    /// [`like`](Self::like) and [`unlike`](Self::unlike).
    pub async fn like_post(&self, post_id: i64) -> Result<Post, DomainError> {
        tracing::debug!("Re-saving liked post id={}", post_id);
        let post = self.find_one(post_id).await?;

        self.post_repo
            .save(post)
            .await
            .map_err(|e| persistence_failure(e, "Failed to like post"))
    }

    /// Posts shared by `user_id`, most recent share first. Shares whose post
    /// is gone are skipped.
    pub async fn get_shared_posts_by_user(&self, user_id: i64) -> Result<Vec<Post>, DomainError> {
        tracing::debug!("Listing posts shared by user_id={}", user_id);
        let shares = self
            .share_repo
            .find_by_user(user_id, SortOrder::Desc, Some(PostRelations::FULL))
            .await?;

        tracing::debug!("Found {} shares for user_id={}", shares.len(), user_id);

        Ok(shares.into_iter().filter_map(|share| share.post).collect())
    }

    pub async fn share_post(&self, post_id: i64, user: &User) -> Result<PostShare, DomainError> {
        tracing::debug!("Sharing post id={} for user_id={}", post_id, user.id);
        let post = self.find_one(post_id).await?;

        if self
            .share_repo
            .find_by_post_and_user(post.id, user.id)
            .await?
            .is_some()
        {
            tracing::warn!("User {} already shared post {}", user.id, post.id);
            return Err(DomainError::AlreadyShared);
        }

        let mut share = PostShare::new(post.id, user.id);
        share.post = Some(post);

        let share = self
            .share_repo
            .insert(share)
            .await
            .map_err(|e| persistence_failure(e, "Failed to share post"))?;

        tracing::info!(
            "Post shared: id={}, post_id={}, user_id={}",
            share.id,
            post_id,
            user.id
        );

        Ok(share)
    }

    /// Records a like. Neither the post nor the user is checked for existence,
    /// and store failures are returned as-is.
    pub async fn like(&self, post_id: i64, user_id: i64) -> Result<Like, DomainError> {
        tracing::debug!("Liking post id={} for user_id={}", post_id, user_id);
        if self
            .like_repo
            .find_by_post_and_user(post_id, user_id)
            .await?
            .is_some()
        {
            tracing::warn!("User {} already liked post {}", user_id, post_id);
            return Err(DomainError::AlreadyLiked);
        }

        let like = self.like_repo.insert(Like::new(post_id, user_id)).await?;

        tracing::info!("Post liked: post_id={}, user_id={}", post_id, user_id);

        Ok(like)
    }

    /// Removes the like if there is one. Unliking twice is not an error.
    pub async fn unlike(&self, post_id: i64, user_id: i64) -> Result<(), DomainError> {
        tracing::debug!("Unliking post id={} for user_id={}", post_id, user_id);
        if let Some(like) = self
            .like_repo
            .find_by_post_and_user(post_id, user_id)
            .await?
        {
            self.like_repo.remove(like.id).await?;
            tracing::info!("Post unliked: post_id={}, user_id={}", post_id, user_id);
        }

        Ok(())
    }

    pub async fn find_likes(&self, post_id: i64) -> Result<Vec<Like>, DomainError> {
        tracing::debug!("Listing likes for post id={}", post_id);
        self.like_repo.find_by_post(post_id).await
    }
}
