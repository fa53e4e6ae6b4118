use async_trait::async_trait;

use super::domain::{NewPost, PostWithAuthor};
use crate::storage::RepositoryError;

/// Storage abstraction for community board posts.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Fails with [`RepositoryError::NotFound`] when the author does not exist.
    async fn insert_post(&self, post: NewPost) -> Result<PostWithAuthor, RepositoryError>;
    /// Every post, newest first.
    async fn recent_posts(&self) -> Result<Vec<PostWithAuthor>, RepositoryError>;
    async fn count_posts(&self) -> Result<u64, RepositoryError>;
}
