pub mod domain;
pub mod repository;
pub mod router;

pub use domain::{
    AuthorSummary, NewUser, User, UserId, UserRegistration, DEFAULT_AUTHOR_EMAIL,
    DEFAULT_DISPLAY_NAME,
};
pub use repository::UserRepository;
pub use router::user_router;
