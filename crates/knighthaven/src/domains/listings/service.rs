use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{
    filter_by_category, DeletedListing, ListingForm, ListingId, ListingWithAuthor, NewListing,
};
use super::repository::ListingRepository;
use crate::campus::CampusDomain;
use crate::domains::users::{
    NewUser, User, UserId, UserRepository, DEFAULT_AUTHOR_EMAIL, DEFAULT_DISPLAY_NAME,
};
use crate::domains::ServiceError;
use crate::uploads::{ImageStore, ImageUpload};

/// Service composing the user directory, listing storage, and image uploads.
pub struct ListingService<S> {
    store: Arc<S>,
    images: Arc<ImageStore>,
    campus: CampusDomain,
}

impl<S> ListingService<S>
where
    S: UserRepository + ListingRepository + 'static,
{
    pub fn new(store: Arc<S>, images: Arc<ImageStore>, campus: CampusDomain) -> Self {
        Self {
            store,
            images,
            campus,
        }
    }

    pub fn upload_limit(&self) -> usize {
        self.images.max_bytes()
    }

    /// Active listings newest-first, optionally narrowed to one category.
    pub async fn list(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<ListingWithAuthor>, ServiceError> {
        let listings = self.store.active_listings().await?;
        Ok(filter_by_category(listings, category))
    }

    /// Create a listing. Campus verification is the client's gate; the server
    /// records whatever author it resolves.
    pub async fn create(
        &self,
        form: ListingForm,
        image: Option<ImageUpload>,
    ) -> Result<ListingWithAuthor, ServiceError> {
        let title = required(form.title.as_deref(), "Title is required")?;
        let category = required(form.category.as_deref(), "Category is required")?;
        let price = form.price_value();
        if price < 0.0 {
            return Err(ServiceError::validation("Price cannot be negative"));
        }

        if let Some(upload) = &image {
            self.images.validate(upload)?;
        }
        let author = self.resolve_author(&form).await?;

        let image_url = match image {
            Some(upload) => Some(self.images.save(upload).await?),
            None => None,
        };

        let listing = NewListing {
            title,
            description: form.description.unwrap_or_default().trim().to_string(),
            price,
            category,
            phone_number: form
                .phone_number
                .map(|phone| phone.trim().to_string())
                .filter(|phone| !phone.is_empty()),
            image_url,
            author_id: author.id,
        };

        let created = self.store.insert_listing(listing).await?;
        info!(
            listing_id = created.listing.id.0,
            author = %created.author.email,
            price = created.listing.price,
            "listing created"
        );
        Ok(created)
    }

    /// Hard-delete a listing owned by `requester_email`.
    pub async fn delete(
        &self,
        id: ListingId,
        requester_email: Option<&str>,
    ) -> Result<DeletedListing, ServiceError> {
        let requester_email = requester_email
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| {
                ServiceError::validation("User email is required to delete listing")
            })?;

        let existing = self
            .store
            .find_listing(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Listing not found"))?;

        if existing.author.email != requester_email {
            warn!(
                listing_id = id.0,
                requester = requester_email,
                "refusing to delete listing owned by another user"
            );
            return Err(ServiceError::Forbidden(
                "You can only delete your own listings".to_string(),
            ));
        }

        self.store.delete_listing(id).await?;
        info!(listing_id = id.0, "listing deleted");

        Ok(DeletedListing {
            id: existing.listing.id,
            title: existing.listing.title,
        })
    }

    async fn resolve_author(&self, form: &ListingForm) -> Result<User, ServiceError> {
        if let Some(raw_id) = form.author_id.as_ref().filter(|value| !value.is_blank()) {
            let id = raw_id
                .as_integer()
                .ok_or_else(|| ServiceError::validation("authorId must be an integer"))?;
            return self
                .store
                .find_user(UserId(id))
                .await?
                .ok_or_else(|| ServiceError::not_found("Author not found"));
        }

        let email = non_blank(form.author_email.as_deref()).unwrap_or(DEFAULT_AUTHOR_EMAIL);
        let name = non_blank(form.author_name.as_deref()).unwrap_or(DEFAULT_DISPLAY_NAME);
        let user = self
            .store
            .find_or_create_user(NewUser::for_campus(email, name, &self.campus))
            .await?;
        Ok(user)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn required(value: Option<&str>, message: &str) -> Result<String, ServiceError> {
    non_blank(value)
        .map(str::to_string)
        .ok_or_else(|| ServiceError::validation(message))
}
