//! Repository behavior against an in-memory SQLite database with the real migrations.

mod common;

use common::{new_place, seed_place};
use knighthaven::domains::listings::{ListingId, ListingRepository, NewListing};
use knighthaven::domains::places::{PlaceId, PlaceRepository};
use knighthaven::domains::posts::{NewPost, PostRepository};
use knighthaven::domains::reviews::{NewReview, ReviewId, ReviewRepository};
use knighthaven::domains::services::{CampusServiceRepository, NewCampusService};
use knighthaven::domains::users::{NewUser, UserId, UserRepository};
use knighthaven::storage::{RepositoryError, SqliteStore};

async fn store() -> SqliteStore {
    SqliteStore::in_memory().await.expect("sqlite store")
}

fn user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        display_name: "Knight".to_string(),
        is_ucf_verified: true,
    }
}

fn listing(title: &str, author_id: UserId) -> NewListing {
    NewListing {
        title: title.to_string(),
        description: "Good condition".to_string(),
        price: 25.0,
        category: "Furniture".to_string(),
        phone_number: Some("407-555-0100".to_string()),
        image_url: None,
        author_id,
    }
}

fn review(place_id: &PlaceId, rating: u8) -> NewReview {
    NewReview {
        place_id: place_id.clone(),
        reviewer_name: "Knightro".to_string(),
        reviewer_email: "knightro@ucf.edu".to_string(),
        is_ucf_verified: true,
        rating,
        content: "Solid".to_string(),
    }
}

#[tokio::test]
async fn users_are_unique_by_email() {
    let store = store().await;
    let created = store.insert_user(user("knight@ucf.edu")).await.expect("insert");
    assert!(created.is_ucf_verified);

    let err = store
        .insert_user(user("knight@ucf.edu"))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, RepositoryError::Conflict));

    let found = store
        .find_or_create_user(user("knight@ucf.edu"))
        .await
        .expect("existing user");
    assert_eq!(found.id, created.id);
    assert_eq!(store.count_users().await.expect("count"), 1);
}

#[tokio::test]
async fn listings_join_author_and_delete() {
    let store = store().await;
    let author = store.insert_user(user("owner@ucf.edu")).await.expect("author");

    let desk = store
        .insert_listing(listing("Desk", author.id))
        .await
        .expect("desk");
    let lamp = store
        .insert_listing(listing("Lamp", author.id))
        .await
        .expect("lamp");
    assert_eq!(desk.author.email, "owner@ucf.edu");

    let active = store.active_listings().await.expect("active");
    let titles: Vec<&str> = active.iter().map(|entry| entry.listing.title.as_str()).collect();
    assert_eq!(titles, vec!["Lamp", "Desk"]);

    store.delete_listing(lamp.listing.id).await.expect("delete");
    assert!(store
        .find_listing(lamp.listing.id)
        .await
        .expect("lookup")
        .is_none());
    assert!(matches!(
        store.delete_listing(ListingId(404)).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
async fn listing_for_unknown_author_is_not_found() {
    let store = store().await;
    let err = store
        .insert_listing(listing("Desk", UserId(42)))
        .await
        .expect_err("foreign key");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[tokio::test]
async fn places_are_listed_best_rated_first() {
    let store = store().await;
    store
        .insert_place(new_place("Average", "restaurants", 3.0))
        .await
        .expect("average");
    let best = store
        .insert_place(new_place("Best", "restaurants", 4.8))
        .await
        .expect("best");

    let places = store.list_places().await.expect("places");
    assert_eq!(places[0].id, best.id);
    assert_eq!(store.count_places().await.expect("count"), 2);
    assert_eq!(
        store.find_place(&best.id).await.expect("lookup"),
        Some(best)
    );
}

#[tokio::test]
async fn reviews_join_place_and_respect_approval() {
    let store = store().await;
    let place = seed_place(&store, "Knight Brew", "coffee shops").await;

    let first = store.insert_review(review(&place.id, 5)).await.expect("first");
    store.insert_review(review(&place.id, 3)).await.expect("second");
    assert_eq!(first.place.name, "Knight Brew");
    assert!(first.review.is_approved);

    let hidden = store
        .set_review_approval(&first.review.id, false)
        .await
        .expect("update")
        .expect("review exists");
    assert!(!hidden.review.is_approved);

    let visible = store
        .reviews_for_place(&place.id, true)
        .await
        .expect("approved");
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].review.rating, 3);

    let everything = store
        .reviews_for_place(&place.id, false)
        .await
        .expect("all for place");
    assert_eq!(everything.len(), 2);
    assert_eq!(store.all_reviews().await.expect("all").len(), 2);
    assert_eq!(store.count_reviews().await.expect("count"), 2);

    assert!(store
        .set_review_approval(&ReviewId("missing".to_string()), true)
        .await
        .expect("update")
        .is_none());
}

#[tokio::test]
async fn rating_outside_range_violates_check_constraint() {
    let store = store().await;
    let place = seed_place(&store, "Knight Brew", "coffee shops").await;
    assert!(store.insert_review(review(&place.id, 6)).await.is_err());
    assert_eq!(store.count_reviews().await.expect("count"), 0);
}

#[tokio::test]
async fn review_for_unknown_place_is_not_found() {
    let store = store().await;
    let err = store
        .insert_review(review(&PlaceId("missing".to_string()), 4))
        .await
        .expect_err("foreign key");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[tokio::test]
async fn posts_join_author_newest_first() {
    let store = store().await;
    let author = store.insert_user(user("poster@ucf.edu")).await.expect("author");

    for title in ["Lost keys", "Found keys"] {
        store
            .insert_post(NewPost {
                title: title.to_string(),
                content: "By the library".to_string(),
                author_id: author.id,
            })
            .await
            .expect("post");
    }

    let posts = store.recent_posts().await.expect("posts");
    let titles: Vec<&str> = posts.iter().map(|entry| entry.post.title.as_str()).collect();
    assert_eq!(titles, vec!["Found keys", "Lost keys"]);
    assert_eq!(posts[0].author.email, "poster@ucf.edu");
    assert_eq!(store.count_posts().await.expect("count"), 2);

    let orphan = store
        .insert_post(NewPost {
            title: "Ghost".to_string(),
            content: "Boo".to_string(),
            author_id: UserId(99),
        })
        .await
        .expect_err("foreign key");
    assert!(matches!(orphan, RepositoryError::NotFound));
}

#[tokio::test]
async fn services_join_author_and_count() {
    let store = store().await;
    let author = store.insert_user(user("tutor@ucf.edu")).await.expect("author");

    let created = store
        .insert_service(NewCampusService {
            title: "Calculus tutoring".to_string(),
            description: "Evenings".to_string(),
            category: "Tutoring".to_string(),
            author_id: author.id,
        })
        .await
        .expect("service");
    assert!(created.service.is_active);
    assert_eq!(created.author.email, "tutor@ucf.edu");

    let active = store.active_services().await.expect("services");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].service.category, "Tutoring");
    assert_eq!(store.count_services().await.expect("count"), 1);
}
