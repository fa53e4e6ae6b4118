//! HTTP-facing domains. Each one follows the same split: `domain` types, a
//! `repository` trait implemented by the stores in [`crate::storage`], an
//! optional `service`, and a `router` exposing the REST endpoints.

pub mod error;
pub mod input;
pub mod listings;
pub mod places;
pub mod posts;
pub mod profile;
pub mod reviews;
pub mod services;
pub mod users;

pub use error::ServiceError;
pub use input::{FlexibleNumber, JsonBody};

/// Category value the views use to mean "no filter".
pub const ALL_CATEGORIES: &str = "All";

/// `?category=` query shared by the list endpoints.
#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct CategoryQuery {
    #[serde(default)]
    pub(crate) category: Option<String>,
}

pub(crate) fn is_unfiltered(category: Option<&str>) -> bool {
    match category.map(str::trim) {
        None => true,
        Some(value) => value.is_empty() || value.eq_ignore_ascii_case(ALL_CATEGORIES),
    }
}
