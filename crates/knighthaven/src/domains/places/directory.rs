use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::YelpConfig;

/// One category search against the business directory.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessQuery {
    pub term: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: u32,
    pub limit: u32,
}

/// Subset of a Yelp business record that the place table keeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<i64>,
    #[serde(default)]
    pub categories: Vec<BusinessCategory>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessCategory {
    #[serde(default)]
    pub alias: Option<String>,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<Business>,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("business directory is not configured: {0}")]
    NotConfigured(&'static str),
    #[error("business directory request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("business directory returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Outbound search hook so ingestion can be exercised without the network.
#[async_trait]
pub trait BusinessDirectory: Debug + Send + Sync {
    async fn search(&self, query: &BusinessQuery) -> Result<Vec<Business>, DirectoryError>;
}

/// Yelp Fusion `businesses/search` client.
#[derive(Clone)]
pub struct YelpClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl YelpClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_config(config: &YelpConfig) -> Self {
        Self::new(config.base_url.clone(), config.api_key.clone())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl std::fmt::Debug for YelpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YelpClient")
            .field("base_url", &self.base_url)
            .field("configured", &self.is_configured())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BusinessDirectory for YelpClient {
    async fn search(&self, query: &BusinessQuery) -> Result<Vec<Business>, DirectoryError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(DirectoryError::NotConfigured("YELP_API_KEY is not set"))?;

        let url = format!("{}/businesses/search", self.base_url);
        debug!(term = %query.term, limit = query.limit, "querying Yelp business search");

        let response = self
            .http
            .get(&url)
            .bearer_auth(api_key)
            .query(&[
                ("term", query.term.clone()),
                ("latitude", query.latitude.to_string()),
                ("longitude", query.longitude.to_string()),
                ("radius", query.radius_meters.to_string()),
                ("limit", query.limit.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Status { status, body });
        }

        let payload: SearchResponse = response.json().await?;
        Ok(payload.businesses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_tolerates_sparse_businesses() {
        let payload = r#"{
            "businesses": [
                {"id": "a", "name": "Full", "rating": 4.0, "review_count": 10,
                 "categories": [{"alias": "coffee", "title": "Coffee & Tea"}],
                 "location": {"address1": "1 Main", "city": "Orlando"},
                 "coordinates": {"latitude": 28.6, "longitude": -81.2}},
                {"id": "b", "name": "Sparse"}
            ],
            "total": 2
        }"#;
        let parsed: SearchResponse = serde_json::from_str(payload).expect("parse search response");
        assert_eq!(parsed.businesses.len(), 2);
        assert_eq!(parsed.businesses[0].categories[0].title, "Coffee & Tea");
        assert!(parsed.businesses[1].location.is_none());
    }

    #[tokio::test]
    async fn search_without_key_is_not_configured() {
        let client = YelpClient::new("https://api.yelp.com/v3/", None);
        assert!(!client.is_configured());

        let query = BusinessQuery {
            term: "spa".to_string(),
            latitude: 28.6024,
            longitude: -81.2001,
            radius_meters: 16093,
            limit: 7,
        };
        let err = client.search(&query).await.expect_err("missing key");
        assert!(matches!(err, DirectoryError::NotConfigured(_)));
    }
}
