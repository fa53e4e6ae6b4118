use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::campus::CampusDomain;

/// Email used when a listing arrives without any author information.
pub const DEFAULT_AUTHOR_EMAIL: &str = "default@ucf.edu";
pub const DEFAULT_DISPLAY_NAME: &str = "KnightHaven User";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub is_ucf_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn author_summary(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.id,
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            is_ucf_verified: self.is_ucf_verified,
        }
    }
}

/// Author details embedded in listing payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    pub is_ucf_verified: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub is_ucf_verified: bool,
}

impl NewUser {
    /// Verification is never taken from the caller; it follows the email domain.
    pub fn for_campus(email: &str, display_name: &str, campus: &CampusDomain) -> Self {
        let email = email.trim().to_string();
        Self {
            is_ucf_verified: campus.verifies(&email),
            email,
            display_name: display_name.trim().to_string(),
        }
    }
}

/// Body accepted by `POST /api/users`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRegistration {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}
