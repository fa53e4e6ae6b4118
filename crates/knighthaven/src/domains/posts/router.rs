use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::info;

use super::domain::PostSubmission;
use super::repository::PostRepository;
use crate::domains::{JsonBody, ServiceError};
use crate::storage::RepositoryError;

/// Router exposing the community board.
pub fn post_router<S>(store: Arc<S>) -> Router
where
    S: PostRepository + 'static,
{
    Router::new()
        .route("/api/posts", get(list_handler::<S>).post(create_handler::<S>))
        .with_state(store)
}

async fn list_handler<S>(State(store): State<Arc<S>>) -> Response
where
    S: PostRepository + 'static,
{
    match store.recent_posts().await {
        Ok(posts) => Json(posts).into_response(),
        Err(err) => ServiceError::from(err).into_response(),
    }
}

async fn create_handler<S>(
    State(store): State<Arc<S>>,
    JsonBody(submission): JsonBody<PostSubmission>,
) -> Response
where
    S: PostRepository + 'static,
{
    let new_post = match submission.validate() {
        Ok(post) => post,
        Err(err) => return err.into_response(),
    };

    match store.insert_post(new_post).await {
        Ok(created) => {
            info!(post_id = created.post.id.0, author = created.author.id.0, "post created");
            Json(created).into_response()
        }
        Err(RepositoryError::NotFound) => {
            ServiceError::not_found("Author not found").into_response()
        }
        Err(err) => ServiceError::from(err).into_response(),
    }
}
