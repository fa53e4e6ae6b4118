pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    filter_by_category, parse_price, DeleteListingRequest, DeletedListing, Listing, ListingForm,
    ListingId, ListingWithAuthor, NewListing,
};
pub use repository::ListingRepository;
pub use router::listing_router;
pub use service::ListingService;
