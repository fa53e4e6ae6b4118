use async_trait::async_trait;

use super::domain::{NewPlace, Place, PlaceId};
use crate::storage::RepositoryError;

/// Storage abstraction for ingested places.
#[async_trait]
pub trait PlaceRepository: Send + Sync {
    async fn count_places(&self) -> Result<u64, RepositoryError>;
    async fn insert_place(&self, place: NewPlace) -> Result<Place, RepositoryError>;
    /// Every place, highest rating first.
    async fn list_places(&self) -> Result<Vec<Place>, RepositoryError>;
    async fn find_place(&self, id: &PlaceId) -> Result<Option<Place>, RepositoryError>;
}
