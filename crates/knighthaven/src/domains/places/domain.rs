use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::directory::Business;
use crate::domains::is_unfiltered;

/// Label stored when Yelp reports no category for a business.
pub const FALLBACK_DESCRIPTION: &str = "Business";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(pub String);

impl PlaceId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A business ingested from the external directory. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: PlaceId,
    pub yelp_id: String,
    pub name: String,
    pub description: String,
    pub original_category: String,
    pub rating: f64,
    pub review_count: i64,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPlace {
    pub yelp_id: String,
    pub name: String,
    pub description: String,
    pub original_category: String,
    pub rating: f64,
    pub review_count: i64,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl NewPlace {
    /// `search_category` is the term the business was fetched under.
    pub fn from_business(business: &Business, search_category: &str) -> Self {
        let location = business.location.as_ref();
        let coordinates = business.coordinates.as_ref();
        Self {
            yelp_id: business.id.clone(),
            name: business.name.clone(),
            description: business
                .categories
                .first()
                .map(|category| category.title.clone())
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string()),
            original_category: search_category.to_string(),
            rating: business.rating.unwrap_or_default(),
            review_count: business.review_count.unwrap_or_default(),
            address: location
                .and_then(|location| location.address1.clone())
                .unwrap_or_default(),
            city: location
                .and_then(|location| location.city.clone())
                .unwrap_or_default(),
            latitude: coordinates.and_then(|coordinates| coordinates.latitude),
            longitude: coordinates.and_then(|coordinates| coordinates.longitude),
        }
    }
}

/// Place fields embedded in review payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSummary {
    pub name: String,
    pub original_category: String,
}

impl From<&Place> for PlaceSummary {
    fn from(place: &Place) -> Self {
        Self {
            name: place.name.clone(),
            original_category: place.original_category.clone(),
        }
    }
}

/// Narrow places to one search category, ignoring case.
pub fn filter_by_category(places: Vec<Place>, category: Option<&str>) -> Vec<Place> {
    if is_unfiltered(category) {
        return places;
    }
    let wanted = category.unwrap_or_default().trim();
    places
        .into_iter()
        .filter(|place| place.original_category.eq_ignore_ascii_case(wanted))
        .collect()
}
