use crate::infra::{ApiComponents, AppState};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use knighthaven::domains::listings::listing_router;
use knighthaven::domains::places::place_router;
use knighthaven::domains::posts::post_router;
use knighthaven::domains::profile::profile_router;
use knighthaven::domains::reviews::review_router;
use knighthaven::domains::services::campus_service_router;
use knighthaven::domains::users::user_router;
use knighthaven::domains::ServiceError;
use knighthaven::storage::{RepositoryError, Store};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct StatsResponse {
    pub(crate) users: u64,
    pub(crate) posts: u64,
    pub(crate) listings: u64,
    pub(crate) services: u64,
    pub(crate) places: u64,
    pub(crate) reviews: u64,
}

pub(crate) fn with_api_routes<S>(components: ApiComponents<S>) -> Router
where
    S: Store,
{
    let ApiComponents {
        store,
        listings,
        reviews,
        places,
        verifier,
        campus,
    } = components;

    let stats = Router::new()
        .route("/api/stats", get(stats_endpoint::<S>))
        .with_state(store.clone());

    listing_router(listings)
        .merge(review_router(reviews))
        .merge(place_router(places))
        .merge(post_router(store.clone()))
        .merge(campus_service_router(store.clone()))
        .merge(user_router(store.clone(), campus.clone()))
        .merge(profile_router(store, verifier, campus))
        .merge(stats)
        .route("/health", get(healthcheck))
        .route("/api/health", get(api_health))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/maps-key", get(maps_key_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn api_health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "message": "KnightHaven API is running!",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// The browser map needs the key at runtime; nothing is compiled in.
pub(crate) async fn maps_key_endpoint(Extension(state): Extension<AppState>) -> Response {
    match state.maps_api_key {
        Some(api_key) => Json(json!({ "apiKey": api_key })).into_response(),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Google Maps API key is not configured" })),
        )
            .into_response(),
    }
}

pub(crate) async fn stats_endpoint<S>(State(store): State<Arc<S>>) -> Response
where
    S: Store,
{
    match collect_stats(store.as_ref()).await {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => ServiceError::from(err).into_response(),
    }
}

async fn collect_stats<S>(store: &S) -> Result<StatsResponse, RepositoryError>
where
    S: Store,
{
    Ok(StatsResponse {
        users: store.count_users().await?,
        posts: store.count_posts().await?,
        listings: store.count_listings().await?,
        services: store.count_services().await?,
        places: store.count_places().await?,
        reviews: store.count_reviews().await?,
    })
}
