use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde_json::json;

use super::domain::{DeleteListingRequest, ListingForm, ListingId};
use super::repository::ListingRepository;
use super::service::ListingService;
use crate::domains::users::UserRepository;
use crate::domains::{CategoryQuery, JsonBody, ServiceError};
use crate::uploads::ImageUpload;

/// Room for the text fields that travel alongside the image in one form.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Router builder exposing the marketplace endpoints.
pub fn listing_router<S>(service: Arc<ListingService<S>>) -> Router
where
    S: UserRepository + ListingRepository + 'static,
{
    let body_limit = service.upload_limit() + FORM_OVERHEAD_BYTES;
    Router::new()
        .route(
            "/api/listings",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route("/api/listings/:id", delete(delete_handler::<S>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

async fn list_handler<S>(
    State(service): State<Arc<ListingService<S>>>,
    Query(query): Query<CategoryQuery>,
) -> Response
where
    S: UserRepository + ListingRepository + 'static,
{
    match service.list(query.category.as_deref()).await {
        Ok(listings) => Json(listings).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Accepts `multipart/form-data` (with an optional `image` file) or a JSON body.
async fn create_handler<S>(
    State(service): State<Arc<ListingService<S>>>,
    request: Request,
) -> Response
where
    S: UserRepository + ListingRepository + 'static,
{
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/json"))
        .unwrap_or(false);

    let parsed = if is_json {
        match JsonBody::<ListingForm>::from_request(request, &()).await {
            Ok(JsonBody(form)) => Ok((form, None)),
            Err(err) => return err.into_response(),
        }
    } else {
        match Multipart::from_request(request, &()).await {
            Ok(multipart) => read_multipart(multipart).await,
            Err(rejection) => return rejection.into_response(),
        }
    };

    let (form, image) = match parsed {
        Ok(parts) => parts,
        Err(err) => return err.into_response(),
    };

    match service.create(form, image).await {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn delete_handler<S>(
    State(service): State<Arc<ListingService<S>>>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Response
where
    S: UserRepository + ListingRepository + 'static,
{
    let request: DeleteListingRequest = if body.is_empty() {
        DeleteListingRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(err) => {
                return ServiceError::validation(format!("invalid request body: {err}"))
                    .into_response()
            }
        }
    };

    match service
        .delete(ListingId(id), request.user_email.as_deref())
        .await
    {
        Ok(deleted) => Json(json!({
            "success": true,
            "message": "Listing deleted successfully",
            "deletedListing": deleted,
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}

async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(ListingForm, Option<ImageUpload>), ServiceError> {
    let mut form = ListingForm::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ServiceError::validation(format!("invalid multipart body: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|err| ServiceError::validation(format!("invalid image upload: {err}")))?;
            // Browsers send an empty part when the file input was left blank.
            if bytes.is_empty() && file_name.as_deref().unwrap_or_default().is_empty() {
                continue;
            }
            image = Some(ImageUpload {
                field_name: name,
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|err| ServiceError::validation(format!("invalid form field {name}: {err}")))?;
        form.assign(&name, value);
    }

    Ok((form, image))
}
