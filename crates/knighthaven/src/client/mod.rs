//! Consumer side of the API: a typed HTTP client, the posting gate the views
//! apply before creating listings, and a disk-backed review cache.

mod api;
mod cache;

pub use api::{ClientError, KnightHavenClient, Viewer};
pub use cache::{CachedReviews, Freshness, ReviewCache, ReviewSource};
