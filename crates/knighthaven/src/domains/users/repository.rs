use async_trait::async_trait;

use super::domain::{NewUser, User, UserId};
use crate::storage::RepositoryError;

/// Storage abstraction for campus users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError>;
    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;
    async fn count_users(&self) -> Result<u64, RepositoryError>;

    /// Resolve a user by email, creating the row on first sight.
    async fn find_or_create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        if let Some(existing) = self.find_user_by_email(&user.email).await? {
            return Ok(existing);
        }

        let email = user.email.clone();
        match self.insert_user(user).await {
            Ok(created) => Ok(created),
            // Another request created the same email between lookup and insert.
            Err(RepositoryError::Conflict) => self
                .find_user_by_email(&email)
                .await?
                .ok_or(RepositoryError::NotFound),
            Err(other) => Err(other),
        }
    }
}
