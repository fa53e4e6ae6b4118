use async_trait::async_trait;

use super::domain::{CampusServiceWithAuthor, NewCampusService};
use crate::storage::RepositoryError;

/// Storage abstraction for advertised campus services.
#[async_trait]
pub trait CampusServiceRepository: Send + Sync {
    /// Fails with [`RepositoryError::NotFound`] when the author does not exist.
    async fn insert_service(
        &self,
        service: NewCampusService,
    ) -> Result<CampusServiceWithAuthor, RepositoryError>;
    /// Active services, newest first.
    async fn active_services(&self) -> Result<Vec<CampusServiceWithAuthor>, RepositoryError>;
    async fn count_services(&self) -> Result<u64, RepositoryError>;
}
