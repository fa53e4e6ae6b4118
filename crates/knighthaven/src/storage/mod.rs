//! Persistence backends for the repository traits declared by each domain.
//!
//! [`SqliteStore`] is the production store; [`MemoryStore`] backs tests and
//! `serve --in-memory`.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, StoreError};

use crate::domains::listings::ListingRepository;
use crate::domains::places::PlaceRepository;
use crate::domains::posts::PostRepository;
use crate::domains::reviews::ReviewRepository;
use crate::domains::services::CampusServiceRepository;
use crate::domains::users::UserRepository;

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict,
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => Self::NotFound,
            _ => Self::Unavailable(err.to_string()),
        }
    }
}

/// Everything the HTTP layer needs from a backend.
pub trait Store:
    UserRepository
    + ListingRepository
    + PlaceRepository
    + ReviewRepository
    + PostRepository
    + CampusServiceRepository
    + 'static
{
}

impl<T> Store for T where
    T: UserRepository
        + ListingRepository
        + PlaceRepository
        + ReviewRepository
        + PostRepository
        + CampusServiceRepository
        + 'static
{
}
