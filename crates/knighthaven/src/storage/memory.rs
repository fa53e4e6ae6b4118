use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::RepositoryError;
use crate::domains::listings::{
    Listing, ListingId, ListingRepository, ListingWithAuthor, NewListing,
};
use crate::domains::places::{NewPlace, Place, PlaceId, PlaceRepository, PlaceSummary};
use crate::domains::posts::{NewPost, Post, PostId, PostRepository, PostWithAuthor};
use crate::domains::reviews::{NewReview, Review, ReviewId, ReviewRepository, ReviewWithPlace};
use crate::domains::services::{
    CampusService, CampusServiceId, CampusServiceRepository, CampusServiceWithAuthor,
    NewCampusService,
};
use crate::domains::users::{NewUser, User, UserId, UserRepository};

/// Process-local store. Rows are kept in insertion order, which is also
/// creation order, so "newest first" is a reverse walk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<User>,
    listings: Vec<Listing>,
    places: Vec<Place>,
    reviews: Vec<Review>,
    posts: Vec<Post>,
    services: Vec<CampusService>,
    next_user_id: i64,
    next_listing_id: i64,
    next_post_id: i64,
    next_service_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store mutex poisoned")
    }
}

impl MemoryState {
    fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    fn place(&self, id: &PlaceId) -> Option<&Place> {
        self.places.iter().find(|place| &place.id == id)
    }

    fn with_author(&self, listing: &Listing) -> Option<ListingWithAuthor> {
        let author = self.user(listing.author_id)?;
        Some(ListingWithAuthor {
            listing: listing.clone(),
            author: author.author_summary(),
        })
    }

    fn post_with_author(&self, post: &Post) -> Option<PostWithAuthor> {
        let author = self.user(post.author_id)?;
        Some(PostWithAuthor {
            post: post.clone(),
            author: author.author_summary(),
        })
    }

    fn service_with_author(&self, service: &CampusService) -> Option<CampusServiceWithAuthor> {
        let author = self.user(service.author_id)?;
        Some(CampusServiceWithAuthor {
            service: service.clone(),
            author: author.author_summary(),
        })
    }

    fn with_place(&self, review: &Review) -> Option<ReviewWithPlace> {
        let place = self.place(&review.place_id)?;
        Some(ReviewWithPlace {
            review: review.clone(),
            place: PlaceSummary::from(place),
        })
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut state = self.lock();
        if state.users.iter().any(|existing| existing.email == user.email) {
            return Err(RepositoryError::Conflict);
        }
        state.next_user_id += 1;
        let created = User {
            id: UserId(state.next_user_id),
            email: user.email,
            display_name: user.display_name,
            is_ucf_verified: user.is_ucf_verified,
            created_at: Utc::now(),
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock().user(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.lock().users.clone())
    }

    async fn count_users(&self) -> Result<u64, RepositoryError> {
        Ok(self.lock().users.len() as u64)
    }
}

#[async_trait]
impl ListingRepository for MemoryStore {
    async fn insert_listing(
        &self,
        listing: NewListing,
    ) -> Result<ListingWithAuthor, RepositoryError> {
        let mut state = self.lock();
        if state.user(listing.author_id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        state.next_listing_id += 1;
        let created = Listing {
            id: ListingId(state.next_listing_id),
            title: listing.title,
            description: listing.description,
            price: listing.price,
            category: listing.category,
            phone_number: listing.phone_number,
            image_url: listing.image_url,
            is_active: true,
            author_id: listing.author_id,
            created_at: Utc::now(),
        };
        state.listings.push(created.clone());
        state
            .with_author(&created)
            .ok_or(RepositoryError::NotFound)
    }

    async fn active_listings(&self) -> Result<Vec<ListingWithAuthor>, RepositoryError> {
        let state = self.lock();
        Ok(state
            .listings
            .iter()
            .rev()
            .filter(|listing| listing.is_active)
            .filter_map(|listing| state.with_author(listing))
            .collect())
    }

    async fn find_listing(
        &self,
        id: ListingId,
    ) -> Result<Option<ListingWithAuthor>, RepositoryError> {
        let state = self.lock();
        Ok(state
            .listings
            .iter()
            .find(|listing| listing.id == id)
            .and_then(|listing| state.with_author(listing)))
    }

    async fn delete_listing(&self, id: ListingId) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        let before = state.listings.len();
        state.listings.retain(|listing| listing.id != id);
        if state.listings.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn count_listings(&self) -> Result<u64, RepositoryError> {
        Ok(self.lock().listings.len() as u64)
    }
}

#[async_trait]
impl PlaceRepository for MemoryStore {
    async fn count_places(&self) -> Result<u64, RepositoryError> {
        Ok(self.lock().places.len() as u64)
    }

    async fn insert_place(&self, place: NewPlace) -> Result<Place, RepositoryError> {
        let created = Place {
            id: PlaceId::generate(),
            yelp_id: place.yelp_id,
            name: place.name,
            description: place.description,
            original_category: place.original_category,
            rating: place.rating,
            review_count: place.review_count,
            address: place.address,
            city: place.city,
            latitude: place.latitude,
            longitude: place.longitude,
            created_at: Utc::now(),
        };
        self.lock().places.push(created.clone());
        Ok(created)
    }

    async fn list_places(&self) -> Result<Vec<Place>, RepositoryError> {
        let mut places = self.lock().places.clone();
        places.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        Ok(places)
    }

    async fn find_place(&self, id: &PlaceId) -> Result<Option<Place>, RepositoryError> {
        Ok(self.lock().place(id).cloned())
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn insert_review(&self, review: NewReview) -> Result<ReviewWithPlace, RepositoryError> {
        let mut state = self.lock();
        if state.place(&review.place_id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        let created = Review {
            id: ReviewId::generate(),
            place_id: review.place_id,
            reviewer_name: review.reviewer_name,
            reviewer_email: review.reviewer_email,
            is_ucf_verified: review.is_ucf_verified,
            rating: review.rating,
            content: review.content,
            is_approved: true,
            created_at: Utc::now(),
        };
        state.reviews.push(created.clone());
        state.with_place(&created).ok_or(RepositoryError::NotFound)
    }

    async fn reviews_for_place(
        &self,
        place_id: &PlaceId,
        approved_only: bool,
    ) -> Result<Vec<ReviewWithPlace>, RepositoryError> {
        let state = self.lock();
        Ok(state
            .reviews
            .iter()
            .rev()
            .filter(|review| &review.place_id == place_id)
            .filter(|review| !approved_only || review.is_approved)
            .filter_map(|review| state.with_place(review))
            .collect())
    }

    async fn all_reviews(&self) -> Result<Vec<ReviewWithPlace>, RepositoryError> {
        let state = self.lock();
        Ok(state
            .reviews
            .iter()
            .rev()
            .filter_map(|review| state.with_place(review))
            .collect())
    }

    async fn set_review_approval(
        &self,
        id: &ReviewId,
        approved: bool,
    ) -> Result<Option<ReviewWithPlace>, RepositoryError> {
        let mut state = self.lock();
        let Some(review) = state.reviews.iter_mut().find(|review| &review.id == id) else {
            return Ok(None);
        };
        review.is_approved = approved;
        let updated = review.clone();
        Ok(state.with_place(&updated))
    }

    async fn count_reviews(&self) -> Result<u64, RepositoryError> {
        Ok(self.lock().reviews.len() as u64)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn insert_post(&self, post: NewPost) -> Result<PostWithAuthor, RepositoryError> {
        let mut state = self.lock();
        if state.user(post.author_id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        state.next_post_id += 1;
        let created = Post {
            id: PostId(state.next_post_id),
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            created_at: Utc::now(),
        };
        state.posts.push(created.clone());
        state
            .post_with_author(&created)
            .ok_or(RepositoryError::NotFound)
    }

    async fn recent_posts(&self) -> Result<Vec<PostWithAuthor>, RepositoryError> {
        let state = self.lock();
        Ok(state
            .posts
            .iter()
            .rev()
            .filter_map(|post| state.post_with_author(post))
            .collect())
    }

    async fn count_posts(&self) -> Result<u64, RepositoryError> {
        Ok(self.lock().posts.len() as u64)
    }
}

#[async_trait]
impl CampusServiceRepository for MemoryStore {
    async fn insert_service(
        &self,
        service: NewCampusService,
    ) -> Result<CampusServiceWithAuthor, RepositoryError> {
        let mut state = self.lock();
        if state.user(service.author_id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        state.next_service_id += 1;
        let created = CampusService {
            id: CampusServiceId(state.next_service_id),
            title: service.title,
            description: service.description,
            category: service.category,
            is_active: true,
            author_id: service.author_id,
            created_at: Utc::now(),
        };
        state.services.push(created.clone());
        state
            .service_with_author(&created)
            .ok_or(RepositoryError::NotFound)
    }

    async fn active_services(&self) -> Result<Vec<CampusServiceWithAuthor>, RepositoryError> {
        let state = self.lock();
        Ok(state
            .services
            .iter()
            .rev()
            .filter(|service| service.is_active)
            .filter_map(|service| state.service_with_author(service))
            .collect())
    }

    async fn count_services(&self) -> Result<u64, RepositoryError> {
        Ok(self.lock().services.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            display_name: "Knight".to_string(),
            is_ucf_verified: email.ends_with("@ucf.edu"),
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store
            .insert_user(new_user("knight@ucf.edu"))
            .await
            .expect("first insert");
        let err = store
            .insert_user(new_user("knight@ucf.edu"))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, RepositoryError::Conflict));
    }

    #[tokio::test]
    async fn listings_come_back_newest_first() {
        let store = MemoryStore::new();
        let author = store
            .insert_user(new_user("knight@ucf.edu"))
            .await
            .expect("author");

        for title in ["Desk", "Chair"] {
            store
                .insert_listing(NewListing {
                    title: title.to_string(),
                    description: String::new(),
                    price: 10.0,
                    category: "Furniture".to_string(),
                    phone_number: None,
                    image_url: None,
                    author_id: author.id,
                })
                .await
                .expect("listing");
        }

        let titles: Vec<String> = store
            .active_listings()
            .await
            .expect("listings")
            .into_iter()
            .map(|entry| entry.listing.title)
            .collect();
        assert_eq!(titles, vec!["Chair", "Desk"]);
    }

    #[tokio::test]
    async fn listing_requires_known_author() {
        let store = MemoryStore::new();
        let err = store
            .insert_listing(NewListing {
                title: "Desk".to_string(),
                description: String::new(),
                price: 10.0,
                category: "Furniture".to_string(),
                phone_number: None,
                image_url: None,
                author_id: UserId(7),
            })
            .await
            .expect_err("no author");
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn posts_need_a_known_author_and_come_back_newest_first() {
        let store = MemoryStore::new();
        let orphan = store
            .insert_post(NewPost {
                title: "Hello".to_string(),
                content: "Anyone around?".to_string(),
                author_id: UserId(3),
            })
            .await
            .expect_err("no author");
        assert!(matches!(orphan, RepositoryError::NotFound));

        let author = store
            .insert_user(new_user("knight@ucf.edu"))
            .await
            .expect("author");
        for title in ["First", "Second"] {
            store
                .insert_post(NewPost {
                    title: title.to_string(),
                    content: "Body".to_string(),
                    author_id: author.id,
                })
                .await
                .expect("post");
        }

        let titles: Vec<String> = store
            .recent_posts()
            .await
            .expect("posts")
            .into_iter()
            .map(|entry| entry.post.title)
            .collect();
        assert_eq!(titles, vec!["Second", "First"]);
        assert_eq!(store.count_posts().await.expect("count"), 2);
    }

    #[tokio::test]
    async fn deleting_missing_listing_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .delete_listing(ListingId(1))
            .await
            .expect_err("nothing to delete");
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
