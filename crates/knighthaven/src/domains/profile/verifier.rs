//! Bearer token verification for the profile endpoint.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{AppEnvironment, AuthConfig};

/// Identity claims carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject: String,
    pub email: String,
    pub name: String,
    pub nickname: String,
    pub email_verified: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No authorization token provided")]
    MissingToken,
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("Token does not carry an email claim")]
    MissingEmail,
    #[error("failed to read token key {path}: {source}")]
    KeyFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid token key: {0}")]
    KeyMaterial(String),
    #[error("no token verification key is configured")]
    NotConfigured,
}

pub trait TokenVerifier: fmt::Debug + Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

impl Claims {
    fn into_identity(self) -> Result<Identity, AuthError> {
        let email = self
            .email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .ok_or(AuthError::MissingEmail)?;
        let local_part = email.split('@').next().unwrap_or_default().to_string();
        let name = self.name.unwrap_or_else(|| email.clone());
        Ok(Identity {
            subject: self.sub,
            nickname: self.nickname.unwrap_or(local_part),
            name,
            email,
            email_verified: self.email_verified,
        })
    }
}

/// Checks signature, expiry, and (when configured) issuer and audience.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn hs256(secret: &str) -> Self {
        Self::with_key(
            DecodingKey::from_secret(secret.as_bytes()),
            Algorithm::HS256,
        )
    }

    pub fn rs256_pem(pem: &[u8]) -> Result<Self, AuthError> {
        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|err| AuthError::KeyMaterial(err.to_string()))?;
        Ok(Self::with_key(key, Algorithm::RS256))
    }

    fn with_key(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;
        Self { key, validation }
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self
    }

    /// The shared secret wins when both a secret and a public key are set.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let verifier = match (&config.jwt_secret, &config.jwt_public_key) {
            (Some(secret), _) => Self::hs256(secret),
            (None, Some(path)) => {
                let pem = std::fs::read(path).map_err(|source| AuthError::KeyFile {
                    path: path.clone(),
                    source,
                })?;
                Self::rs256_pem(&pem)?
            }
            (None, None) => return Err(AuthError::NotConfigured),
        };

        let verifier = match config.issuer.as_deref() {
            Some(issuer) => verifier.with_issuer(issuer),
            None => verifier,
        };
        Ok(match config.audience.as_deref() {
            Some(audience) => verifier.with_audience(audience),
            None => verifier,
        })
    }
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("issuer", &self.validation.iss)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        data.claims.into_identity()
    }
}

/// Accepts any non-empty token as the fixed local identity. Never built in production.
#[derive(Debug, Clone, Default)]
pub struct DevelopmentVerifier;

impl DevelopmentVerifier {
    pub fn identity() -> Identity {
        Identity {
            subject: "auth0|development".to_string(),
            email: "user@ucf.edu".to_string(),
            name: "Auth0 User".to_string(),
            nickname: "auth0user".to_string(),
            email_verified: true,
        }
    }
}

impl TokenVerifier for DevelopmentVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }
        Ok(Self::identity())
    }
}

pub fn verifier_from_config(
    config: &AuthConfig,
    environment: AppEnvironment,
) -> Result<Arc<dyn TokenVerifier>, AuthError> {
    if config.has_key() {
        return Ok(Arc::new(JwtVerifier::from_config(config)?));
    }
    if environment.is_production() {
        return Err(AuthError::NotConfigured);
    }
    warn!("no token key configured; profile endpoint accepts any bearer token");
    Ok(Arc::new(DevelopmentVerifier))
}
