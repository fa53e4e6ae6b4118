pub mod domain;
pub mod repository;
pub mod router;

pub use domain::{NewPost, Post, PostId, PostSubmission, PostWithAuthor};
pub use repository::PostRepository;
pub use router::post_router;
