use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::api::{ClientError, KnightHavenClient};
use crate::domains::reviews::{filter_by_category, ReviewWithPlace};

/// Where the cache pulls the system-wide review list from.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn fetch_reviews(&self) -> Result<Vec<ReviewWithPlace>, ClientError>;
}

#[async_trait]
impl ReviewSource for KnightHavenClient {
    async fn fetch_reviews(&self) -> Result<Vec<ReviewWithPlace>, ClientError> {
        self.all_reviews(None).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Freshness {
    Fresh,
    /// The last fetch failed; the reviews are whatever was cached before.
    Stale { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedReviews {
    pub reviews: Vec<ReviewWithPlace>,
    pub freshness: Freshness,
}

impl CachedReviews {
    pub fn is_stale(&self) -> bool {
        matches!(self.freshness, Freshness::Stale { .. })
    }

    /// Narrow to one place category; `All` keeps everything.
    pub fn in_category(&self, category: Option<&str>) -> Vec<ReviewWithPlace> {
        filter_by_category(self.reviews.clone(), category)
    }
}

/// Approved reviews mirrored to a JSON file so the review view survives a
/// failed fetch.
pub struct ReviewCache<R> {
    source: R,
    path: PathBuf,
    reviews: Vec<ReviewWithPlace>,
}

impl<R> ReviewCache<R>
where
    R: ReviewSource,
{
    /// Open the cache at `path`. A missing file starts empty; an unreadable one
    /// is logged and discarded.
    pub async fn open(source: R, path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let reviews = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<ReviewWithPlace>>(&bytes) {
                Ok(reviews) => reviews,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "discarding unreadable review cache");
                    Vec::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            source,
            path,
            reviews,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached reviews without touching the network.
    pub fn cached(&self) -> &[ReviewWithPlace] {
        &self.reviews
    }

    /// Fetch from the source and replace the cache with the approved subset.
    /// On failure the previous set is served and flagged stale.
    pub async fn refresh(&mut self) -> Result<CachedReviews, ClientError> {
        match self.source.fetch_reviews().await {
            Ok(fetched) => {
                self.reviews = fetched
                    .into_iter()
                    .filter(|entry| entry.review.is_approved)
                    .collect();
                self.persist().await?;
                info!(count = self.reviews.len(), "review cache refreshed");
                Ok(CachedReviews {
                    reviews: self.reviews.clone(),
                    freshness: Freshness::Fresh,
                })
            }
            Err(err) => {
                warn!(error = %err, cached = self.reviews.len(), "review fetch failed; serving cached reviews");
                Ok(CachedReviews {
                    reviews: self.reviews.clone(),
                    freshness: Freshness::Stale {
                        reason: err.to_string(),
                    },
                })
            }
        }
    }

    /// Merge a review the viewer just submitted so it shows before the next
    /// refresh. Unapproved or already-cached reviews are ignored.
    pub async fn remember(&mut self, review: ReviewWithPlace) -> Result<(), ClientError> {
        if !review.review.is_approved
            || self
                .reviews
                .iter()
                .any(|entry| entry.review.id == review.review.id)
        {
            return Ok(());
        }
        self.reviews.insert(0, review);
        self.persist().await
    }

    async fn persist(&self) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(&self.reviews)?;
        tokio::fs::write(&self.path, body).await?;
        Ok(())
    }
}
