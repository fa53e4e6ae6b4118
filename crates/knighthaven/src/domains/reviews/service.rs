use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{filter_by_category, ReviewId, ReviewSubmission, ReviewWithPlace};
use super::repository::ReviewRepository;
use crate::campus::CampusDomain;
use crate::domains::places::{PlaceId, PlaceRepository};
use crate::domains::ServiceError;

pub struct ReviewService<S> {
    store: Arc<S>,
    campus: CampusDomain,
}

impl<S> ReviewService<S>
where
    S: PlaceRepository + ReviewRepository + 'static,
{
    pub fn new(store: Arc<S>, campus: CampusDomain) -> Self {
        Self { store, campus }
    }

    /// Approved reviews for one place, newest first.
    pub async fn for_place(&self, place_id: &PlaceId) -> Result<Vec<ReviewWithPlace>, ServiceError> {
        Ok(self.store.reviews_for_place(place_id, true).await?)
    }

    /// Every review regardless of approval, narrowed by the place's category.
    pub async fn all(&self, category: Option<&str>) -> Result<Vec<ReviewWithPlace>, ServiceError> {
        let reviews = self.store.all_reviews().await?;
        Ok(filter_by_category(reviews, category))
    }

    pub async fn submit(
        &self,
        submission: ReviewSubmission,
    ) -> Result<ReviewWithPlace, ServiceError> {
        let review = submission.validate(&self.campus)?;

        if self.store.find_place(&review.place_id).await?.is_none() {
            warn!(place_id = %review.place_id.0, "review submitted for unknown place");
            return Err(ServiceError::not_found("Place not found"));
        }

        let created = self.store.insert_review(review).await?;
        info!(
            review_id = %created.review.id.0,
            place_id = %created.review.place_id.0,
            rating = created.review.rating,
            verified = created.review.is_ucf_verified,
            "review submitted"
        );
        Ok(created)
    }

    pub async fn set_approval(
        &self,
        id: &ReviewId,
        approved: Option<bool>,
    ) -> Result<ReviewWithPlace, ServiceError> {
        let approved =
            approved.ok_or_else(|| ServiceError::validation("isApproved must be a boolean"))?;

        let updated = self
            .store
            .set_review_approval(id, approved)
            .await?
            .ok_or_else(|| ServiceError::not_found("Review not found"))?;
        info!(review_id = %id.0, approved, "review moderation updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::places::NewPlace;
    use crate::domains::FlexibleNumber;
    use crate::storage::MemoryStore;

    async fn seeded() -> (ReviewService<MemoryStore>, PlaceId) {
        let store = Arc::new(MemoryStore::default());
        let place = store
            .insert_place(NewPlace {
                yelp_id: "yelp-1".to_string(),
                name: "Knight Bites".to_string(),
                description: "Sandwiches".to_string(),
                original_category: "restaurants".to_string(),
                rating: 4.5,
                review_count: 10,
                address: "4000 Central Florida Blvd".to_string(),
                city: "Orlando".to_string(),
                latitude: Some(28.6),
                longitude: Some(-81.2),
            })
            .await
            .expect("place stored");
        (ReviewService::new(store, CampusDomain::default()), place.id)
    }

    fn submission(place_id: &PlaceId, rating: i64) -> ReviewSubmission {
        ReviewSubmission {
            place_id: Some(place_id.0.clone()),
            reviewer_name: Some("Knightro".to_string()),
            reviewer_email: Some("knightro@ucf.edu".to_string()),
            is_ucf_verified: Some(true),
            rating: Some(FlexibleNumber::Integer(rating)),
            content: Some("Fast and friendly".to_string()),
        }
    }

    #[tokio::test]
    async fn submitted_reviews_are_approved_and_joined() {
        let (service, place_id) = seeded().await;

        let created = service
            .submit(submission(&place_id, 5))
            .await
            .expect("review stored");
        assert!(created.review.is_approved);
        assert_eq!(created.place.name, "Knight Bites");

        let listed = service.for_place(&place_id).await.expect("reviews");
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn unknown_place_is_not_found() {
        let (service, _) = seeded().await;
        let err = service
            .submit(submission(&PlaceId("missing".to_string()), 4))
            .await
            .expect_err("no such place");
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn unapproved_reviews_leave_the_place_view() {
        let (service, place_id) = seeded().await;
        let created = service
            .submit(submission(&place_id, 2))
            .await
            .expect("review stored");

        let hidden = service
            .set_approval(&created.review.id, Some(false))
            .await
            .expect("moderated");
        assert!(!hidden.review.is_approved);

        assert!(service.for_place(&place_id).await.expect("reviews").is_empty());
        assert_eq!(service.all(None).await.expect("all reviews").len(), 1);
    }

    #[tokio::test]
    async fn approval_requires_flag_and_known_review() {
        let (service, _) = seeded().await;
        let id = ReviewId("missing".to_string());

        let missing_flag = service.set_approval(&id, None).await.expect_err("flag");
        assert!(matches!(missing_flag, ServiceError::Validation(_)));

        let unknown = service
            .set_approval(&id, Some(true))
            .await
            .expect_err("unknown review");
        assert!(matches!(unknown, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn all_filters_on_place_category() {
        let (service, place_id) = seeded().await;
        service
            .submit(submission(&place_id, 4))
            .await
            .expect("review stored");

        assert_eq!(service.all(Some("Restaurants")).await.expect("all").len(), 1);
        assert!(service.all(Some("spa")).await.expect("all").is_empty());
    }
}
