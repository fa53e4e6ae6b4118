//! Student-offered services (tutoring, rides, repairs) advertised to campus.

pub mod domain;
pub mod repository;
pub mod router;

pub use domain::{
    filter_by_category, CampusService, CampusServiceId, CampusServiceWithAuthor,
    NewCampusService, ServiceSubmission,
};
pub use repository::CampusServiceRepository;
pub use router::campus_service_router;
