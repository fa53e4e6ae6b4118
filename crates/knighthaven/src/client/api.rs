use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domains::listings::{
    DeleteListingRequest, DeletedListing, ListingForm, ListingId, ListingWithAuthor,
};
use crate::domains::places::{IngestionReport, Place, PlaceId};
use crate::domains::profile::Profile;
use crate::domains::reviews::{ReviewSubmission, ReviewWithPlace};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("Sign in to post listings")]
    SignedOut,
    #[error("Only UCF verified students can post listings")]
    Unverified,
    #[error("review cache io: {0}")]
    Io(#[from] std::io::Error),
    #[error("review cache is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Who is looking at the views. Listing creation is gated on a verified profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Viewer {
    profile: Option<Profile>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(profile: Profile) -> Self {
        Self {
            profile: Some(profile),
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn can_post_listings(&self) -> bool {
        self.profile
            .as_ref()
            .map(|profile| profile.is_ucf_verified)
            .unwrap_or(false)
    }

    fn poster(&self) -> Result<&Profile, ClientError> {
        let profile = self.profile.as_ref().ok_or(ClientError::SignedOut)?;
        if !profile.is_ucf_verified {
            return Err(ClientError::Unverified);
        }
        Ok(profile)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct ReviewEnvelope {
    review: ReviewWithPlace,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteEnvelope {
    deleted_listing: DeletedListing,
}

#[derive(Debug, Serialize)]
struct CategoryParam<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
}

/// Typed client for the KnightHaven REST API.
#[derive(Debug, Clone)]
pub struct KnightHavenClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl KnightHavenClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Bearer token sent with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn places(&self, category: Option<&str>) -> Result<Vec<Place>, ClientError> {
        self.send(
            self.request(Method::GET, "/api/places")
                .query(&CategoryParam { category }),
        )
        .await
    }

    pub async fn refresh_places(&self) -> Result<IngestionReport, ClientError> {
        self.send(self.request(Method::GET, "/api/refresh-data"))
            .await
    }

    pub async fn listings(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<ListingWithAuthor>, ClientError> {
        self.send(
            self.request(Method::GET, "/api/listings")
                .query(&CategoryParam { category }),
        )
        .await
    }

    /// Post a listing as `viewer`. The author fields are taken from the
    /// viewer's profile, never from the form.
    pub async fn create_listing(
        &self,
        viewer: &Viewer,
        mut form: ListingForm,
    ) -> Result<ListingWithAuthor, ClientError> {
        let poster = viewer.poster()?;
        form.author_id = None;
        form.author_email = Some(poster.email.clone());
        form.author_name = Some(poster.name.clone());

        self.send(self.request(Method::POST, "/api/listings").json(&form))
            .await
    }

    pub async fn delete_listing(
        &self,
        viewer: &Viewer,
        id: ListingId,
    ) -> Result<DeletedListing, ClientError> {
        let profile = viewer.profile().ok_or(ClientError::SignedOut)?;
        let body = DeleteListingRequest {
            user_email: Some(profile.email.clone()),
        };
        let envelope: DeleteEnvelope = self
            .send(
                self.request(Method::DELETE, &format!("/api/listings/{}", id.0))
                    .json(&body),
            )
            .await?;
        Ok(envelope.deleted_listing)
    }

    pub async fn reviews_for_place(
        &self,
        place_id: &PlaceId,
    ) -> Result<Vec<ReviewWithPlace>, ClientError> {
        self.send(self.request(Method::GET, &format!("/api/reviews/{}", place_id.0)))
            .await
    }

    pub async fn all_reviews(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<ReviewWithPlace>, ClientError> {
        self.send(
            self.request(Method::GET, "/api/reviews")
                .query(&CategoryParam { category }),
        )
        .await
    }

    pub async fn submit_review(
        &self,
        submission: &ReviewSubmission,
    ) -> Result<ReviewWithPlace, ClientError> {
        let envelope: ReviewEnvelope = self
            .send(self.request(Method::POST, "/api/reviews").json(submission))
            .await?;
        Ok(envelope.review)
    }

    pub async fn profile(&self) -> Result<Profile, ClientError> {
        self.send(self.request(Method::GET, "/api/user/profile"))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, url = %url, "knighthaven api request");
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T>(&self, builder: RequestBuilder) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|parsed| parsed.error)
                .unwrap_or(body);
            return Err(ClientError::Status { status, message });
        }
        Ok(response.json().await?)
    }
}
