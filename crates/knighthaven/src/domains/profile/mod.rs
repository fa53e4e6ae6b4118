pub mod router;
pub mod verifier;

pub use router::{bearer_token, profile_router, Profile};
pub use verifier::{
    verifier_from_config, AuthError, DevelopmentVerifier, Identity, JwtVerifier, TokenVerifier,
};
