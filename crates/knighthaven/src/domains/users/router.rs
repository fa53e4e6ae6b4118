use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::info;

use super::domain::{NewUser, UserRegistration, DEFAULT_DISPLAY_NAME};
use super::repository::UserRepository;
use crate::campus::CampusDomain;
use crate::domains::{JsonBody, ServiceError};
use crate::storage::RepositoryError;

struct UserRoutes<S> {
    store: Arc<S>,
    campus: CampusDomain,
}

/// Router exposing the user directory.
pub fn user_router<S>(store: Arc<S>, campus: CampusDomain) -> Router
where
    S: UserRepository + 'static,
{
    let routes = Arc::new(UserRoutes { store, campus });
    Router::new()
        .route(
            "/api/users",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .with_state(routes)
}

async fn list_handler<S>(State(routes): State<Arc<UserRoutes<S>>>) -> Response
where
    S: UserRepository + 'static,
{
    match routes.store.list_users().await {
        Ok(users) => Json(users).into_response(),
        Err(err) => ServiceError::from(err).into_response(),
    }
}

async fn create_handler<S>(
    State(routes): State<Arc<UserRoutes<S>>>,
    JsonBody(registration): JsonBody<UserRegistration>,
) -> Response
where
    S: UserRepository + 'static,
{
    let email = match registration.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => email.to_string(),
        _ => return ServiceError::validation("Email is required").into_response(),
    };
    let display_name = registration
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DISPLAY_NAME);

    let new_user = NewUser::for_campus(&email, display_name, &routes.campus);
    match routes.store.insert_user(new_user).await {
        Ok(user) => {
            info!(user_id = user.id.0, verified = user.is_ucf_verified, "user registered");
            (StatusCode::CREATED, Json(user)).into_response()
        }
        Err(RepositoryError::Conflict) => {
            ServiceError::Conflict(format!("A user with email {email} already exists"))
                .into_response()
        }
        Err(err) => ServiceError::from(err).into_response(),
    }
}
