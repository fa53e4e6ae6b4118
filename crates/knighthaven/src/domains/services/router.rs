use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::info;

use super::domain::{filter_by_category, ServiceSubmission};
use super::repository::CampusServiceRepository;
use crate::domains::{CategoryQuery, JsonBody, ServiceError};
use crate::storage::RepositoryError;

/// Router exposing the campus services board.
pub fn campus_service_router<S>(store: Arc<S>) -> Router
where
    S: CampusServiceRepository + 'static,
{
    Router::new()
        .route(
            "/api/services",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .with_state(store)
}

async fn list_handler<S>(
    State(store): State<Arc<S>>,
    Query(query): Query<CategoryQuery>,
) -> Response
where
    S: CampusServiceRepository + 'static,
{
    match store.active_services().await {
        Ok(services) => Json(filter_by_category(services, query.category.as_deref())).into_response(),
        Err(err) => ServiceError::from(err).into_response(),
    }
}

async fn create_handler<S>(
    State(store): State<Arc<S>>,
    JsonBody(submission): JsonBody<ServiceSubmission>,
) -> Response
where
    S: CampusServiceRepository + 'static,
{
    let new_service = match submission.validate() {
        Ok(service) => service,
        Err(err) => return err.into_response(),
    };

    match store.insert_service(new_service).await {
        Ok(created) => {
            info!(
                service_id = created.service.id.0,
                category = %created.service.category,
                "campus service created"
            );
            Json(created).into_response()
        }
        Err(RepositoryError::NotFound) => {
            ServiceError::not_found("Author not found").into_response()
        }
        Err(err) => ServiceError::from(err).into_response(),
    }
}
