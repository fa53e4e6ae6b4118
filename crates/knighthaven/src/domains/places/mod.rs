pub mod directory;
pub mod domain;
pub mod ingestion;
pub mod repository;
pub mod router;

pub use directory::{
    Business, BusinessCategory, BusinessDirectory, BusinessQuery, Coordinates, DirectoryError,
    Location, YelpClient,
};
pub use domain::{filter_by_category, NewPlace, Place, PlaceId, PlaceSummary};
pub use ingestion::{
    IngestionReport, IngestionSettings, PlaceIngestion, CAMPUS_CATEGORIES, CAMPUS_LATITUDE,
    CAMPUS_LONGITUDE, CAMPUS_RADIUS_METERS, PLACE_CAP,
};
pub use repository::PlaceRepository;
pub use router::place_router;
