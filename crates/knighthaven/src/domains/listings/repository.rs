use async_trait::async_trait;

use super::domain::{ListingId, ListingWithAuthor, NewListing};
use crate::storage::RepositoryError;

/// Storage abstraction for marketplace listings.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn insert_listing(&self, listing: NewListing)
        -> Result<ListingWithAuthor, RepositoryError>;
    /// Active listings, newest first.
    async fn active_listings(&self) -> Result<Vec<ListingWithAuthor>, RepositoryError>;
    async fn find_listing(&self, id: ListingId)
        -> Result<Option<ListingWithAuthor>, RepositoryError>;
    /// Returns [`RepositoryError::NotFound`] when no row was removed.
    async fn delete_listing(&self, id: ListingId) -> Result<(), RepositoryError>;
    async fn count_listings(&self) -> Result<u64, RepositoryError>;
}
