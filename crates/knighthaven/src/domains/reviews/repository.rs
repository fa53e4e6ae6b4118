use async_trait::async_trait;

use super::domain::{NewReview, ReviewId, ReviewWithPlace};
use crate::domains::places::PlaceId;
use crate::storage::RepositoryError;

/// Storage abstraction for place reviews. Listings are newest first.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Fails with [`RepositoryError::NotFound`] when the place does not exist.
    async fn insert_review(&self, review: NewReview) -> Result<ReviewWithPlace, RepositoryError>;
    async fn reviews_for_place(
        &self,
        place_id: &PlaceId,
        approved_only: bool,
    ) -> Result<Vec<ReviewWithPlace>, RepositoryError>;
    async fn all_reviews(&self) -> Result<Vec<ReviewWithPlace>, RepositoryError>;
    async fn set_review_approval(
        &self,
        id: &ReviewId,
        approved: bool,
    ) -> Result<Option<ReviewWithPlace>, RepositoryError>;
    async fn count_reviews(&self) -> Result<u64, RepositoryError>;
}
