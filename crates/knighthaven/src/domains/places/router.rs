use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::domain::filter_by_category;
use super::ingestion::PlaceIngestion;
use super::repository::PlaceRepository;
use crate::domains::CategoryQuery;

/// Router exposing stored places and the seeding trigger.
pub fn place_router<S>(ingestion: Arc<PlaceIngestion<S>>) -> Router
where
    S: PlaceRepository + 'static,
{
    Router::new()
        .route("/api/places", get(list_handler::<S>))
        .route("/api/refresh-data", get(refresh_handler::<S>))
        .with_state(ingestion)
}

async fn list_handler<S>(
    State(ingestion): State<Arc<PlaceIngestion<S>>>,
    Query(query): Query<CategoryQuery>,
) -> Response
where
    S: PlaceRepository + 'static,
{
    match ingestion.places().await {
        Ok(places) => Json(filter_by_category(places, query.category.as_deref())).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn refresh_handler<S>(State(ingestion): State<Arc<PlaceIngestion<S>>>) -> Response
where
    S: PlaceRepository + 'static,
{
    match ingestion.run().await {
        Ok(report) => Json(report).into_response(),
        Err(err) => err.into_response(),
    }
}
