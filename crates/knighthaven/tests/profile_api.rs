//! Bearer-token profile lookups.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

use common::send;
use knighthaven::campus::CampusDomain;
use knighthaven::domains::profile::{profile_router, DevelopmentVerifier, JwtVerifier};
use knighthaven::domains::users::UserRepository;
use knighthaven::storage::MemoryStore;

const SECRET: &str = "knighthaven-test-secret";

fn jwt_router() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let router = profile_router(
        store.clone(),
        Arc::new(JwtVerifier::hs256(SECRET)),
        CampusDomain::default(),
    );
    (router, store)
}

fn sign(secret: &str, email: &str, email_verified: bool) -> String {
    let claims = json!({
        "sub": "auth0|knight",
        "email": email,
        "name": "Knight Student",
        "nickname": "knight",
        "email_verified": email_verified,
        "exp": chrono::Utc::now().timestamp() + 600,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("sign token")
}

fn profile_request(token: Option<&str>) -> Request<Body> {
    let builder = Request::builder().method("GET").uri("/api/user/profile");
    let builder = match token {
        Some(token) => builder.header("authorization", format!("Bearer {token}")),
        None => builder,
    };
    builder.body(Body::empty()).expect("request")
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (router, _) = jwt_router();
    let (status, body) = send(&router, profile_request(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "No authorization token provided");
}

#[tokio::test]
async fn forged_token_is_unauthorized() {
    let (router, store) = jwt_router();
    let forged = sign("some-other-secret", "knight@ucf.edu", true);

    let (status, _) = send(&router, profile_request(Some(&forged))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&router, profile_request(Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(store.count_users().await.expect("count"), 0);
}

#[tokio::test]
async fn valid_token_returns_profile_and_registers_user() {
    let (router, store) = jwt_router();
    let token = sign(SECRET, "knight@ucf.edu", true);

    let (status, body) = send(&router, profile_request(Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Knight Student");
    assert_eq!(body["nickname"], "knight");
    assert_eq!(body["email"], "knight@ucf.edu");
    assert_eq!(body["isUCFVerified"], true);

    let user = store
        .find_user_by_email("knight@ucf.edu")
        .await
        .expect("lookup")
        .expect("user registered");
    assert_eq!(body["id"], user.id.0);

    let (_, again) = send(&router, profile_request(Some(&token))).await;
    assert_eq!(again["id"], user.id.0);
    assert_eq!(store.count_users().await.expect("count"), 1);
}

#[tokio::test]
async fn unverified_or_off_campus_email_is_not_campus_verified() {
    let (router, _) = jwt_router();

    let unverified = sign(SECRET, "knight@ucf.edu", false);
    let (_, body) = send(&router, profile_request(Some(&unverified))).await;
    assert_eq!(body["isUCFVerified"], false);

    let outsider = sign(SECRET, "fan@gmail.com", true);
    let (_, body) = send(&router, profile_request(Some(&outsider))).await;
    assert_eq!(body["isUCFVerified"], false);
}

#[tokio::test]
async fn development_verifier_returns_fixed_identity() {
    let store = Arc::new(MemoryStore::default());
    let router = profile_router(
        store,
        Arc::new(DevelopmentVerifier),
        CampusDomain::default(),
    );

    let (status, body) = send(&router, profile_request(Some("anything"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Auth0 User");
    assert_eq!(body["email"], "user@ucf.edu");
    assert_eq!(body["isUCFVerified"], true);
}
