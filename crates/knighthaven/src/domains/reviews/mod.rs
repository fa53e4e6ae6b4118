pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    filter_by_category, ApprovalUpdate, NewReview, Review, ReviewId, ReviewSubmission,
    ReviewWithPlace, MAX_RATING, MIN_RATING,
};
pub use repository::ReviewRepository;
pub use router::review_router;
pub use service::ReviewService;
