//! Shared fixtures for the HTTP and storage scenarios.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use knighthaven::domains::places::{
    Business, BusinessCategory, BusinessDirectory, BusinessQuery, Coordinates, DirectoryError,
    Location, NewPlace, Place, PlaceRepository,
};

pub fn scratch_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("knighthaven-{label}-{}", uuid::Uuid::new_v4()))
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialize body")))
        .expect("request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router dispatch");
    let status = response.status();
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let payload = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json payload")
    };
    (status, payload)
}

pub fn new_place(name: &str, category: &str, rating: f64) -> NewPlace {
    NewPlace {
        yelp_id: format!("yelp-{name}"),
        name: name.to_string(),
        description: "Business".to_string(),
        original_category: category.to_string(),
        rating,
        review_count: 12,
        address: "4000 Central Florida Blvd".to_string(),
        city: "Orlando".to_string(),
        latitude: Some(28.6024),
        longitude: Some(-81.2001),
    }
}

pub async fn seed_place<S: PlaceRepository>(store: &S, name: &str, category: &str) -> Place {
    store
        .insert_place(new_place(name, category, 4.0))
        .await
        .expect("seed place")
}

pub fn business(id: &str, term: &str) -> Business {
    Business {
        id: id.to_string(),
        name: format!("{term} #{id}"),
        rating: Some(4.0),
        review_count: Some(20),
        categories: vec![BusinessCategory {
            alias: None,
            title: "Local Favorite".to_string(),
        }],
        location: Some(Location {
            address1: Some("1 University Blvd".to_string()),
            city: Some("Orlando".to_string()),
        }),
        coordinates: Some(Coordinates {
            latitude: Some(28.6),
            longitude: Some(-81.2),
        }),
    }
}

/// Directory double returning `per_term` businesses for every term except the
/// ones listed in `failing`.
#[derive(Debug, Default)]
pub struct FakeDirectory {
    pub per_term: usize,
    pub failing: Vec<String>,
    pub queries: Mutex<Vec<BusinessQuery>>,
}

impl FakeDirectory {
    pub fn returning(per_term: usize) -> Arc<Self> {
        Arc::new(Self {
            per_term,
            ..Self::default()
        })
    }

    pub fn failing_on(per_term: usize, failing: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            per_term,
            failing: failing.iter().map(|term| term.to_string()).collect(),
            ..Self::default()
        })
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().expect("queries mutex").len()
    }
}

#[async_trait]
impl BusinessDirectory for FakeDirectory {
    async fn search(&self, query: &BusinessQuery) -> Result<Vec<Business>, DirectoryError> {
        self.queries.lock().expect("queries mutex").push(query.clone());
        if self.failing.contains(&query.term) {
            return Err(DirectoryError::NotConfigured("simulated outage"));
        }
        Ok((0..self.per_term)
            .map(|index| business(&format!("{}-{index}", query.term), &query.term))
            .collect())
    }
}
