//! Community posts and campus services through their HTTP routers.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use serde_json::json;

use common::{get, json_request, send};
use knighthaven::domains::posts::{post_router, PostRepository};
use knighthaven::domains::services::{campus_service_router, CampusServiceRepository};
use knighthaven::domains::users::{NewUser, User, UserRepository};
use knighthaven::storage::MemoryStore;

async fn store_with_author() -> (Arc<MemoryStore>, User) {
    let store = Arc::new(MemoryStore::default());
    let author = store
        .insert_user(NewUser {
            email: "knight@ucf.edu".to_string(),
            display_name: "Knight".to_string(),
            is_ucf_verified: true,
        })
        .await
        .expect("author");
    (store, author)
}

fn routers(store: &Arc<MemoryStore>) -> Router {
    post_router(store.clone()).merge(campus_service_router(store.clone()))
}

#[tokio::test]
async fn post_is_created_with_author_and_listed() {
    let (store, author) = store_with_author().await;
    let router = routers(&store);

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/api/posts",
            &json!({"title": "Study group", "content": "Thursday 6pm", "authorId": author.id.0.to_string()}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["title"], "Study group");
    assert_eq!(body["author"]["displayName"], "Knight");
    assert_eq!(body["author"]["isUcfVerified"], true);

    let (_, posts) = send(&router, get("/api/posts")).await;
    assert_eq!(posts.as_array().expect("array").len(), 1);
}

#[tokio::test]
async fn post_validation_and_unknown_author() {
    let (store, _) = store_with_author().await;
    let router = routers(&store);

    let (status, body) = send(
        &router,
        json_request("POST", "/api/posts", &json!({"title": "Study group", "authorId": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Content is required");

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/api/posts",
            &json!({"title": "Study group", "content": "Thursday", "authorId": 77}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Author not found");

    let (status, body) = send(
        &router,
        json_request("POST", "/api/posts", &json!({"title": 5, "content": "x", "authorId": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(store.count_posts().await.expect("count"), 0);
}

#[tokio::test]
async fn services_are_created_and_filtered_by_category() {
    let (store, author) = store_with_author().await;
    let router = routers(&store);

    for (title, category) in [("Calculus tutoring", "Tutoring"), ("Bike repair", "Repairs")] {
        let (status, body) = send(
            &router,
            json_request(
                "POST",
                "/api/services",
                &json!({"title": title, "description": "Ask me", "category": category, "authorId": author.id.0}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["isActive"], true);
    }

    let (_, tutoring) = send(&router, get("/api/services?category=Tutoring")).await;
    let tutoring = tutoring.as_array().expect("array");
    assert_eq!(tutoring.len(), 1);
    assert_eq!(tutoring[0]["title"], "Calculus tutoring");

    let (_, everything) = send(&router, get("/api/services?category=All")).await;
    let everything = everything.as_array().expect("array");
    assert_eq!(everything.len(), 2);
    assert_eq!(everything[0]["title"], "Bike repair");
}

#[tokio::test]
async fn service_without_category_is_rejected() {
    let (store, author) = store_with_author().await;
    let router = routers(&store);

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/api/services",
            &json!({"title": "Calculus tutoring", "authorId": author.id.0}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Category is required");
    assert_eq!(store.count_services().await.expect("count"), 0);
}
