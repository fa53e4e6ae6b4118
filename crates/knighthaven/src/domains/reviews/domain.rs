use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campus::CampusDomain;
use crate::domains::places::{PlaceId, PlaceSummary};
use crate::domains::{is_unfiltered, FlexibleNumber, ServiceError};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub String);

impl ReviewId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub place_id: PlaceId,
    pub reviewer_name: String,
    pub reviewer_email: String,
    #[serde(rename = "isUCFVerified")]
    pub is_ucf_verified: bool,
    pub rating: u8,
    pub content: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Review joined with the place fields the review list renders and filters on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewWithPlace {
    #[serde(flatten)]
    pub review: Review,
    pub place: PlaceSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub place_id: PlaceId,
    pub reviewer_name: String,
    pub reviewer_email: String,
    pub is_ucf_verified: bool,
    pub rating: u8,
    pub content: String,
}

/// Body of `POST /api/reviews`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default)]
    pub reviewer_email: Option<String>,
    #[serde(default, rename = "isUCFVerified")]
    pub is_ucf_verified: Option<bool>,
    #[serde(default)]
    pub rating: Option<FlexibleNumber>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ReviewSubmission {
    /// Check required fields and the rating range. The verified flag needs both
    /// the identity provider's claim and a campus email.
    pub fn validate(self, campus: &CampusDomain) -> Result<NewReview, ServiceError> {
        let missing = || ServiceError::validation("Missing required fields");

        let place_id = non_blank(self.place_id).ok_or_else(missing)?;
        let reviewer_name = non_blank(self.reviewer_name).ok_or_else(missing)?;
        let reviewer_email = non_blank(self.reviewer_email).ok_or_else(missing)?;
        let content = non_blank(self.content).ok_or_else(missing)?;
        let rating = self
            .rating
            .filter(|rating| !rating.is_blank())
            .ok_or_else(missing)?;

        let rating = rating
            .as_integer()
            .ok_or_else(|| ServiceError::validation("Rating must be a whole number"))?;
        let rating = u8::try_from(rating)
            .ok()
            .filter(|value| (MIN_RATING..=MAX_RATING).contains(value))
            .ok_or_else(|| {
                ServiceError::validation(format!(
                    "Rating must be between {MIN_RATING} and {MAX_RATING}"
                ))
            })?;

        let is_ucf_verified =
            self.is_ucf_verified.unwrap_or(false) && campus.verifies(&reviewer_email);

        Ok(NewReview {
            place_id: PlaceId(place_id),
            reviewer_name,
            reviewer_email,
            is_ucf_verified,
            rating,
            content,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Body of `PUT /api/reviews/:reviewId`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalUpdate {
    #[serde(default)]
    pub is_approved: Option<bool>,
}

/// Narrow reviews by the category of the place they belong to, ignoring case.
pub fn filter_by_category(
    reviews: Vec<ReviewWithPlace>,
    category: Option<&str>,
) -> Vec<ReviewWithPlace> {
    if is_unfiltered(category) {
        return reviews;
    }
    let wanted = category.unwrap_or_default().trim();
    reviews
        .into_iter()
        .filter(|entry| entry.place.original_category.eq_ignore_ascii_case(wanted))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(rating: FlexibleNumber) -> ReviewSubmission {
        ReviewSubmission {
            place_id: Some("place-1".to_string()),
            reviewer_name: Some("Knightro".to_string()),
            reviewer_email: Some("knightro@ucf.edu".to_string()),
            is_ucf_verified: Some(true),
            rating: Some(rating),
            content: Some("Great coffee between classes".to_string()),
        }
    }

    #[test]
    fn validate_accepts_numeric_strings() {
        let review = submission(FlexibleNumber::from("4"))
            .validate(&CampusDomain::default())
            .expect("valid review");
        assert_eq!(review.rating, 4);
        assert!(review.is_ucf_verified);
    }

    #[test]
    fn validate_rejects_out_of_range_ratings() {
        for rating in [0, 6, -1] {
            let err = submission(FlexibleNumber::Integer(rating))
                .validate(&CampusDomain::default())
                .expect_err("out of range");
            assert!(matches!(err, ServiceError::Validation(_)), "rating {rating}");
        }
    }

    #[test]
    fn validate_rejects_fractional_ratings() {
        let err = submission(FlexibleNumber::Float(4.5))
            .validate(&CampusDomain::default())
            .expect_err("fractional");
        assert!(err.to_string().contains("whole number"));
    }

    #[test]
    fn validate_requires_every_field() {
        let mut blank_content = submission(FlexibleNumber::Integer(5));
        blank_content.content = Some("   ".to_string());
        let err = blank_content
            .validate(&CampusDomain::default())
            .expect_err("content required");
        assert_eq!(err.to_string(), "Missing required fields");

        let mut no_rating = submission(FlexibleNumber::Integer(5));
        no_rating.rating = None;
        assert!(no_rating.validate(&CampusDomain::default()).is_err());
    }

    #[test]
    fn verified_flag_requires_campus_email() {
        let mut outsider = submission(FlexibleNumber::Integer(3));
        outsider.reviewer_email = Some("fan@gmail.com".to_string());
        let review = outsider
            .validate(&CampusDomain::default())
            .expect("valid review");
        assert!(!review.is_ucf_verified);

        let mut unclaimed = submission(FlexibleNumber::Integer(3));
        unclaimed.is_ucf_verified = None;
        let review = unclaimed
            .validate(&CampusDomain::default())
            .expect("valid review");
        assert!(!review.is_ucf_verified);
    }

    #[test]
    fn review_serializes_with_wire_names() {
        let entry = ReviewWithPlace {
            review: Review {
                id: ReviewId("r-1".to_string()),
                place_id: PlaceId("p-1".to_string()),
                reviewer_name: "Knightro".to_string(),
                reviewer_email: "knightro@ucf.edu".to_string(),
                is_ucf_verified: true,
                rating: 5,
                content: "Solid".to_string(),
                is_approved: true,
                created_at: Utc::now(),
            },
            place: PlaceSummary {
                name: "Knight Bites".to_string(),
                original_category: "restaurants".to_string(),
            },
        };

        let value = serde_json::to_value(&entry).expect("serialize review");
        assert_eq!(value["placeId"], "p-1");
        assert_eq!(value["isUCFVerified"], true);
        assert_eq!(value["isApproved"], true);
        assert_eq!(value["place"]["name"], "Knight Bites");
        assert_eq!(value["place"]["originalCategory"], "restaurants");

        let back: ReviewWithPlace = serde_json::from_value(value).expect("deserialize review");
        assert_eq!(back.review.rating, 5);
    }
}
