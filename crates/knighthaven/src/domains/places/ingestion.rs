use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::directory::{Business, BusinessDirectory, BusinessQuery};
use super::domain::{NewPlace, Place};
use super::repository::PlaceRepository;
use crate::domains::ServiceError;

/// Search terms fanned out on every seeding run.
pub const CAMPUS_CATEGORIES: [&str; 8] = [
    "restaurants",
    "mechanics",
    "autoservice",
    "nail salon",
    "barber shop",
    "hair salon",
    "spa",
    "coffee shops",
];

/// UCF Student Union.
pub const CAMPUS_LATITUDE: f64 = 28.6024;
pub const CAMPUS_LONGITUDE: f64 = -81.2001;
/// Ten miles.
pub const CAMPUS_RADIUS_METERS: u32 = 16_093;
pub const PLACE_CAP: usize = 50;

const ALREADY_LOADED: &str = "Already loaded";

#[derive(Debug, Clone, PartialEq)]
pub struct IngestionSettings {
    pub categories: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: u32,
    pub place_cap: usize,
}

impl IngestionSettings {
    pub fn campus() -> Self {
        Self {
            categories: CAMPUS_CATEGORIES.iter().map(|term| term.to_string()).collect(),
            latitude: CAMPUS_LATITUDE,
            longitude: CAMPUS_LONGITUDE,
            radius_meters: CAMPUS_RADIUS_METERS,
            place_cap: PLACE_CAP,
        }
    }

    /// Results requested per category so the fan-out can fill the cap: `ceil(cap / categories)`.
    pub fn per_category_limit(&self) -> u32 {
        if self.categories.is_empty() {
            return 0;
        }
        let per_category = self.place_cap.div_ceil(self.categories.len());
        u32::try_from(per_category).unwrap_or(u32::MAX)
    }

    fn query(&self, term: &str) -> BusinessQuery {
        BusinessQuery {
            term: term.to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
            radius_meters: self.radius_meters,
            limit: self.per_category_limit(),
        }
    }
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self::campus()
    }
}

/// Outcome of a seeding run, returned verbatim by `GET /api/refresh-data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionReport {
    pub message: String,
    pub stored: u64,
    pub total: u64,
    pub categories: Vec<String>,
}

impl IngestionReport {
    pub fn skipped(existing: u64) -> Self {
        Self {
            message: format!("Data already exists with {existing} places"),
            stored: existing,
            total: existing,
            categories: vec![ALREADY_LOADED.to_string()],
        }
    }

    pub fn is_skip(&self) -> bool {
        self.categories.len() == 1 && self.categories[0] == ALREADY_LOADED
    }
}

/// One-shot seeding of the place table from the business directory.
///
/// The emptiness check and the inserts are not wrapped in a transaction, so two
/// concurrent runs against an empty table can both seed.
pub struct PlaceIngestion<S> {
    store: Arc<S>,
    directory: Arc<dyn BusinessDirectory>,
    settings: IngestionSettings,
}

impl<S> PlaceIngestion<S>
where
    S: PlaceRepository + 'static,
{
    pub fn new(
        store: Arc<S>,
        directory: Arc<dyn BusinessDirectory>,
        settings: IngestionSettings,
    ) -> Self {
        Self {
            store,
            directory,
            settings,
        }
    }

    pub fn settings(&self) -> &IngestionSettings {
        &self.settings
    }

    /// Stored places, best rated first.
    pub async fn places(&self) -> Result<Vec<Place>, ServiceError> {
        Ok(self.store.list_places().await?)
    }

    pub async fn run(&self) -> Result<IngestionReport, ServiceError> {
        let existing = self.store.count_places().await?;
        if existing > 0 {
            info!(existing, "place table already seeded; skipping fetch");
            return Ok(IngestionReport::skipped(existing));
        }

        let mut fetched = self.fetch_all().await;
        let total = fetched.len() as u64;
        fastrand::shuffle(&mut fetched);

        let mut stored = 0usize;
        for (category, business) in &fetched {
            if stored >= self.settings.place_cap {
                info!(cap = self.settings.place_cap, "place cap reached; stopping");
                break;
            }

            match self
                .store
                .insert_place(NewPlace::from_business(business, category))
                .await
            {
                Ok(place) => {
                    stored += 1;
                    info!(place_id = %place.id.0, name = %place.name, category = %category, "stored place");
                }
                Err(err) => {
                    warn!(yelp_id = %business.id, name = %business.name, error = %err, "failed to store place");
                }
            }
        }

        info!(stored, total, "place ingestion finished");
        Ok(IngestionReport {
            message: "Successfully refreshed data".to_string(),
            stored: stored as u64,
            total,
            categories: self.settings.categories.clone(),
        })
    }

    /// Every business paired with the category it was fetched under. A failed
    /// category is logged and skipped.
    async fn fetch_all(&self) -> Vec<(String, Business)> {
        let mut fetched = Vec::new();
        for category in &self.settings.categories {
            let query = self.settings.query(category);
            match self.directory.search(&query).await {
                Ok(businesses) if businesses.is_empty() => {
                    info!(category = %category, "no businesses found");
                }
                Ok(businesses) => {
                    info!(category = %category, count = businesses.len(), "fetched businesses");
                    fetched.extend(
                        businesses
                            .into_iter()
                            .map(|business| (category.clone(), business)),
                    );
                }
                Err(err) => {
                    warn!(category = %category, error = %err, "business search failed; continuing");
                }
            }
        }
        fetched
    }
}
