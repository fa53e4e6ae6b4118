use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::domain::{ApprovalUpdate, ReviewId, ReviewSubmission};
use super::repository::ReviewRepository;
use super::service::ReviewService;
use crate::domains::places::{PlaceId, PlaceRepository};
use crate::domains::{CategoryQuery, JsonBody};

/// Router exposing review submission, listing, and moderation.
///
/// `GET /api/reviews/:id` reads a place id and `PUT /api/reviews/:id` a review
/// id; both share one route entry.
pub fn review_router<S>(service: Arc<ReviewService<S>>) -> Router
where
    S: PlaceRepository + ReviewRepository + 'static,
{
    Router::new()
        .route(
            "/api/reviews",
            get(list_all_handler::<S>).post(submit_handler::<S>),
        )
        .route(
            "/api/reviews/:id",
            get(list_for_place_handler::<S>).put(approval_handler::<S>),
        )
        .with_state(service)
}

async fn list_all_handler<S>(
    State(service): State<Arc<ReviewService<S>>>,
    Query(query): Query<CategoryQuery>,
) -> Response
where
    S: PlaceRepository + ReviewRepository + 'static,
{
    match service.all(query.category.as_deref()).await {
        Ok(reviews) => Json(reviews).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn list_for_place_handler<S>(
    State(service): State<Arc<ReviewService<S>>>,
    Path(place_id): Path<String>,
) -> Response
where
    S: PlaceRepository + ReviewRepository + 'static,
{
    match service.for_place(&PlaceId(place_id)).await {
        Ok(reviews) => Json(reviews).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn submit_handler<S>(
    State(service): State<Arc<ReviewService<S>>>,
    JsonBody(submission): JsonBody<ReviewSubmission>,
) -> Response
where
    S: PlaceRepository + ReviewRepository + 'static,
{
    match service.submit(submission).await {
        Ok(review) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Review submitted successfully.",
                "review": review,
            })),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

async fn approval_handler<S>(
    State(service): State<Arc<ReviewService<S>>>,
    Path(review_id): Path<String>,
    JsonBody(update): JsonBody<ApprovalUpdate>,
) -> Response
where
    S: PlaceRepository + ReviewRepository + 'static,
{
    match service
        .set_approval(&ReviewId(review_id), update.is_approved)
        .await
    {
        Ok(review) => {
            let verdict = if review.review.is_approved {
                "approved"
            } else {
                "rejected"
            };
            Json(json!({
                "message": format!("Review {verdict} successfully"),
                "review": review,
            }))
            .into_response()
        }
        Err(err) => err.into_response(),
    }
}
