use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use knighthaven::campus::CampusDomain;
use knighthaven::config::AppConfig;
use knighthaven::domains::listings::ListingService;
use knighthaven::domains::places::{IngestionSettings, PlaceIngestion, YelpClient};
use knighthaven::domains::profile::{verifier_from_config, TokenVerifier};
use knighthaven::domains::reviews::ReviewService;
use knighthaven::error::AppError;
use knighthaven::storage::Store;
use knighthaven::uploads::ImageStore;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) maps_api_key: Option<String>,
}

/// Services sharing one store, wired from configuration.
pub(crate) struct ApiComponents<S> {
    pub(crate) store: Arc<S>,
    pub(crate) listings: Arc<ListingService<S>>,
    pub(crate) reviews: Arc<ReviewService<S>>,
    pub(crate) places: Arc<PlaceIngestion<S>>,
    pub(crate) verifier: Arc<dyn TokenVerifier>,
    pub(crate) campus: CampusDomain,
}

impl<S> ApiComponents<S>
where
    S: Store,
{
    pub(crate) fn from_config(config: &AppConfig, store: Arc<S>) -> Result<Self, AppError> {
        let campus = CampusDomain::new(&config.campus.email_domain);
        let verifier = verifier_from_config(&config.auth, config.environment)?;
        let images = Arc::new(ImageStore::from_config(&config.uploads));
        let directory = Arc::new(YelpClient::from_config(&config.yelp));

        Ok(Self {
            listings: Arc::new(ListingService::new(store.clone(), images, campus.clone())),
            reviews: Arc::new(ReviewService::new(store.clone(), campus.clone())),
            places: Arc::new(PlaceIngestion::new(
                store.clone(),
                directory,
                IngestionSettings::campus(),
            )),
            store,
            verifier,
            campus,
        })
    }
}
