use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::verifier::{AuthError, TokenVerifier};
use crate::campus::CampusDomain;
use crate::domains::users::{NewUser, UserId, UserRepository};
use crate::domains::ServiceError;

/// Body of `GET /api/user/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub name: String,
    pub nickname: String,
    pub email: String,
    #[serde(rename = "isUCFVerified")]
    pub is_ucf_verified: bool,
}

struct ProfileRoutes<S> {
    store: Arc<S>,
    verifier: Arc<dyn TokenVerifier>,
    campus: CampusDomain,
}

pub fn profile_router<S>(
    store: Arc<S>,
    verifier: Arc<dyn TokenVerifier>,
    campus: CampusDomain,
) -> Router
where
    S: UserRepository + 'static,
{
    let routes = Arc::new(ProfileRoutes {
        store,
        verifier,
        campus,
    });
    Router::new()
        .route("/api/user/profile", get(profile_handler::<S>))
        .with_state(routes)
}

/// Token from `Authorization: Bearer <token>`, if one is present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

async fn profile_handler<S>(
    State(routes): State<Arc<ProfileRoutes<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: UserRepository + 'static,
{
    match resolve_profile(&routes, &headers).await {
        Ok(profile) => Json(profile).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn resolve_profile<S>(
    routes: &ProfileRoutes<S>,
    headers: &HeaderMap,
) -> Result<Profile, ServiceError>
where
    S: UserRepository + 'static,
{
    let token = bearer_token(headers)
        .ok_or_else(|| ServiceError::Unauthorized(AuthError::MissingToken.to_string()))?;

    let identity = routes.verifier.verify(token).map_err(|err| {
        debug!(error = %err, "rejected profile token");
        ServiceError::Unauthorized(err.to_string())
    })?;

    let is_ucf_verified = identity.email_verified && routes.campus.verifies(&identity.email);
    let mut new_user = NewUser::for_campus(&identity.email, &identity.name, &routes.campus);
    new_user.is_ucf_verified = is_ucf_verified;
    let user = routes.store.find_or_create_user(new_user).await?;

    Ok(Profile {
        id: user.id,
        name: identity.name,
        nickname: identity.nickname,
        email: user.email,
        is_ucf_verified,
    })
}
