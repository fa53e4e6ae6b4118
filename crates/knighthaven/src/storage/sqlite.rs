use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::info;

use super::RepositoryError;
use crate::config::DatabaseConfig;
use crate::domains::listings::{
    Listing, ListingId, ListingRepository, ListingWithAuthor, NewListing,
};
use crate::domains::places::{NewPlace, Place, PlaceId, PlaceRepository, PlaceSummary};
use crate::domains::posts::{NewPost, Post, PostId, PostRepository, PostWithAuthor};
use crate::domains::reviews::{NewReview, Review, ReviewId, ReviewRepository, ReviewWithPlace};
use crate::domains::services::{
    CampusService, CampusServiceId, CampusServiceRepository, CampusServiceWithAuthor,
    NewCampusService,
};
use crate::domains::users::{AuthorSummary, NewUser, User, UserId, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to open database: {0}")]
    Connect(#[from] sqlx::Error),
    #[error("failed to apply migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// SQLite-backed store. Schema lives in `migrations/` and is applied on connect.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        info!(url = %config.url, "connected to database");
        Self::migrated(pool).await
    }

    /// Private in-memory database. A single connection that never idles out,
    /// otherwise each new connection would see an empty schema.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::migrated(pool).await
    }

    async fn migrated(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

const USER_COLUMNS: &str = "id, email, display_name, is_ucf_verified, created_at";

const LISTING_SELECT: &str = "SELECT l.id, l.title, l.description, l.price, l.category, \
     l.phone_number, l.image_url, l.is_active, l.author_id, l.created_at, \
     u.display_name AS author_display_name, u.email AS author_email, \
     u.is_ucf_verified AS author_is_ucf_verified \
     FROM listings l JOIN users u ON u.id = l.author_id";

const POST_SELECT: &str = "SELECT p.id, p.title, p.content, p.author_id, p.created_at, \
     u.display_name AS author_display_name, u.email AS author_email, \
     u.is_ucf_verified AS author_is_ucf_verified \
     FROM posts p JOIN users u ON u.id = p.author_id";

const SERVICE_SELECT: &str = "SELECT s.id, s.title, s.description, s.category, s.is_active, \
     s.author_id, s.created_at, \
     u.display_name AS author_display_name, u.email AS author_email, \
     u.is_ucf_verified AS author_is_ucf_verified \
     FROM services s JOIN users u ON u.id = s.author_id";

const PLACE_COLUMNS: &str = "id, yelp_id, name, description, original_category, rating, \
     review_count, address, city, latitude, longitude, created_at";

const REVIEW_SELECT: &str = "SELECT r.id, r.place_id, r.reviewer_name, r.reviewer_email, \
     r.is_ucf_verified, r.rating, r.content, r.is_approved, r.created_at, \
     p.name AS place_name, p.original_category AS place_category \
     FROM reviews r JOIN places p ON p.id = r.place_id";

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    display_name: String,
    is_ucf_verified: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            email: row.email,
            display_name: row.display_name,
            is_ucf_verified: row.is_ucf_verified,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ListingRow {
    id: i64,
    title: String,
    description: String,
    price: f64,
    category: String,
    phone_number: Option<String>,
    image_url: Option<String>,
    is_active: bool,
    author_id: i64,
    created_at: DateTime<Utc>,
    author_display_name: String,
    author_email: String,
    author_is_ucf_verified: bool,
}

impl From<ListingRow> for ListingWithAuthor {
    fn from(row: ListingRow) -> Self {
        Self {
            listing: Listing {
                id: ListingId(row.id),
                title: row.title,
                description: row.description,
                price: row.price,
                category: row.category,
                phone_number: row.phone_number,
                image_url: row.image_url,
                is_active: row.is_active,
                author_id: UserId(row.author_id),
                created_at: row.created_at,
            },
            author: AuthorSummary {
                id: UserId(row.author_id),
                display_name: row.author_display_name,
                email: row.author_email,
                is_ucf_verified: row.author_is_ucf_verified,
            },
        }
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    author_id: i64,
    created_at: DateTime<Utc>,
    author_display_name: String,
    author_email: String,
    author_is_ucf_verified: bool,
}

impl From<PostRow> for PostWithAuthor {
    fn from(row: PostRow) -> Self {
        Self {
            post: Post {
                id: PostId(row.id),
                title: row.title,
                content: row.content,
                author_id: UserId(row.author_id),
                created_at: row.created_at,
            },
            author: AuthorSummary {
                id: UserId(row.author_id),
                display_name: row.author_display_name,
                email: row.author_email,
                is_ucf_verified: row.author_is_ucf_verified,
            },
        }
    }
}

#[derive(Debug, FromRow)]
struct ServiceRow {
    id: i64,
    title: String,
    description: String,
    category: String,
    is_active: bool,
    author_id: i64,
    created_at: DateTime<Utc>,
    author_display_name: String,
    author_email: String,
    author_is_ucf_verified: bool,
}

impl From<ServiceRow> for CampusServiceWithAuthor {
    fn from(row: ServiceRow) -> Self {
        Self {
            service: CampusService {
                id: CampusServiceId(row.id),
                title: row.title,
                description: row.description,
                category: row.category,
                is_active: row.is_active,
                author_id: UserId(row.author_id),
                created_at: row.created_at,
            },
            author: AuthorSummary {
                id: UserId(row.author_id),
                display_name: row.author_display_name,
                email: row.author_email,
                is_ucf_verified: row.author_is_ucf_verified,
            },
        }
    }
}

#[derive(Debug, FromRow)]
struct PlaceRow {
    id: String,
    yelp_id: String,
    name: String,
    description: String,
    original_category: String,
    rating: f64,
    review_count: i64,
    address: String,
    city: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_at: DateTime<Utc>,
}

impl From<PlaceRow> for Place {
    fn from(row: PlaceRow) -> Self {
        Self {
            id: PlaceId(row.id),
            yelp_id: row.yelp_id,
            name: row.name,
            description: row.description,
            original_category: row.original_category,
            rating: row.rating,
            review_count: row.review_count,
            address: row.address,
            city: row.city,
            latitude: row.latitude,
            longitude: row.longitude,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ReviewRow {
    id: String,
    place_id: String,
    reviewer_name: String,
    reviewer_email: String,
    is_ucf_verified: bool,
    rating: i64,
    content: String,
    is_approved: bool,
    created_at: DateTime<Utc>,
    place_name: String,
    place_category: String,
}

impl TryFrom<ReviewRow> for ReviewWithPlace {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating).map_err(|_| {
            RepositoryError::Unavailable(format!("review {} has rating {}", row.id, row.rating))
        })?;
        Ok(Self {
            review: Review {
                id: ReviewId(row.id),
                place_id: PlaceId(row.place_id),
                reviewer_name: row.reviewer_name,
                reviewer_email: row.reviewer_email,
                is_ucf_verified: row.is_ucf_verified,
                rating,
                content: row.content,
                is_approved: row.is_approved,
                created_at: row.created_at,
            },
            place: PlaceSummary {
                name: row.place_name,
                original_category: row.place_category,
            },
        })
    }
}

fn reviews_from_rows(rows: Vec<ReviewRow>) -> Result<Vec<ReviewWithPlace>, RepositoryError> {
    rows.into_iter().map(ReviewWithPlace::try_from).collect()
}

async fn count(pool: &SqlitePool, table: &str) -> Result<u64, RepositoryError> {
    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await?;
    Ok(u64::try_from(total).unwrap_or_default())
}

impl SqliteStore {
    async fn listing_by_id(
        &self,
        id: ListingId,
    ) -> Result<Option<ListingWithAuthor>, RepositoryError> {
        let row = sqlx::query_as::<_, ListingRow>(&format!("{LISTING_SELECT} WHERE l.id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ListingWithAuthor::from))
    }

    async fn review_by_id(&self, id: &ReviewId) -> Result<Option<ReviewWithPlace>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!("{REVIEW_SELECT} WHERE r.id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ReviewWithPlace::try_from).transpose()
    }
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (email, display_name, is_ucf_verified, created_at) \
             VALUES (?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.is_ucf_verified)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row =
            sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn count_users(&self) -> Result<u64, RepositoryError> {
        count(&self.pool, "users").await
    }
}

#[async_trait]
impl ListingRepository for SqliteStore {
    async fn insert_listing(
        &self,
        listing: NewListing,
    ) -> Result<ListingWithAuthor, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO listings \
             (title, description, price, category, phone_number, image_url, is_active, author_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)",
        )
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(&listing.category)
        .bind(&listing.phone_number)
        .bind(&listing.image_url)
        .bind(listing.author_id.0)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.listing_by_id(ListingId(result.last_insert_rowid()))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn active_listings(&self) -> Result<Vec<ListingWithAuthor>, RepositoryError> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "{LISTING_SELECT} WHERE l.is_active = 1 ORDER BY l.created_at DESC, l.id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ListingWithAuthor::from).collect())
    }

    async fn find_listing(
        &self,
        id: ListingId,
    ) -> Result<Option<ListingWithAuthor>, RepositoryError> {
        self.listing_by_id(id).await
    }

    async fn delete_listing(&self, id: ListingId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn count_listings(&self) -> Result<u64, RepositoryError> {
        count(&self.pool, "listings").await
    }
}

#[async_trait]
impl PlaceRepository for SqliteStore {
    async fn count_places(&self) -> Result<u64, RepositoryError> {
        count(&self.pool, "places").await
    }

    async fn insert_place(&self, place: NewPlace) -> Result<Place, RepositoryError> {
        let row = sqlx::query_as::<_, PlaceRow>(&format!(
            "INSERT INTO places \
             (id, yelp_id, name, description, original_category, rating, review_count, \
              address, city, latitude, longitude, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {PLACE_COLUMNS}"
        ))
        .bind(PlaceId::generate().0)
        .bind(&place.yelp_id)
        .bind(&place.name)
        .bind(&place.description)
        .bind(&place.original_category)
        .bind(place.rating)
        .bind(place.review_count)
        .bind(&place.address)
        .bind(&place.city)
        .bind(place.latitude)
        .bind(place.longitude)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn list_places(&self) -> Result<Vec<Place>, RepositoryError> {
        let rows = sqlx::query_as::<_, PlaceRow>(&format!(
            "SELECT {PLACE_COLUMNS} FROM places ORDER BY rating DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Place::from).collect())
    }

    async fn find_place(&self, id: &PlaceId) -> Result<Option<Place>, RepositoryError> {
        let row = sqlx::query_as::<_, PlaceRow>(&format!(
            "SELECT {PLACE_COLUMNS} FROM places WHERE id = ?"
        ))
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Place::from))
    }
}

#[async_trait]
impl ReviewRepository for SqliteStore {
    async fn insert_review(&self, review: NewReview) -> Result<ReviewWithPlace, RepositoryError> {
        let id = ReviewId::generate();
        sqlx::query(
            "INSERT INTO reviews \
             (id, place_id, reviewer_name, reviewer_email, is_ucf_verified, rating, content, is_approved, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?)",
        )
        .bind(&id.0)
        .bind(&review.place_id.0)
        .bind(&review.reviewer_name)
        .bind(&review.reviewer_email)
        .bind(review.is_ucf_verified)
        .bind(i64::from(review.rating))
        .bind(&review.content)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.review_by_id(&id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn reviews_for_place(
        &self,
        place_id: &PlaceId,
        approved_only: bool,
    ) -> Result<Vec<ReviewWithPlace>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "{REVIEW_SELECT} WHERE r.place_id = ? AND (r.is_approved = 1 OR ? = 0) \
             ORDER BY r.created_at DESC, r.rowid DESC"
        ))
        .bind(&place_id.0)
        .bind(approved_only)
        .fetch_all(&self.pool)
        .await?;
        reviews_from_rows(rows)
    }

    async fn all_reviews(&self) -> Result<Vec<ReviewWithPlace>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "{REVIEW_SELECT} ORDER BY r.created_at DESC, r.rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        reviews_from_rows(rows)
    }

    async fn set_review_approval(
        &self,
        id: &ReviewId,
        approved: bool,
    ) -> Result<Option<ReviewWithPlace>, RepositoryError> {
        let result = sqlx::query("UPDATE reviews SET is_approved = ? WHERE id = ?")
            .bind(approved)
            .bind(&id.0)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.review_by_id(id).await
    }

    async fn count_reviews(&self) -> Result<u64, RepositoryError> {
        count(&self.pool, "reviews").await
    }
}

#[async_trait]
impl PostRepository for SqliteStore {
    async fn insert_post(&self, post: NewPost) -> Result<PostWithAuthor, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO posts (title, content, author_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author_id.0)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.id = ?"))
            .bind(result.last_insert_rowid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(PostWithAuthor::from).ok_or(RepositoryError::NotFound)
    }

    async fn recent_posts(&self) -> Result<Vec<PostWithAuthor>, RepositoryError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{POST_SELECT} ORDER BY p.created_at DESC, p.id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PostWithAuthor::from).collect())
    }

    async fn count_posts(&self) -> Result<u64, RepositoryError> {
        count(&self.pool, "posts").await
    }
}

#[async_trait]
impl CampusServiceRepository for SqliteStore {
    async fn insert_service(
        &self,
        service: NewCampusService,
    ) -> Result<CampusServiceWithAuthor, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO services (title, description, category, is_active, author_id, created_at) \
             VALUES (?, ?, ?, 1, ?, ?)",
        )
        .bind(&service.title)
        .bind(&service.description)
        .bind(&service.category)
        .bind(service.author_id.0)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, ServiceRow>(&format!("{SERVICE_SELECT} WHERE s.id = ?"))
            .bind(result.last_insert_rowid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(CampusServiceWithAuthor::from)
            .ok_or(RepositoryError::NotFound)
    }

    async fn active_services(&self) -> Result<Vec<CampusServiceWithAuthor>, RepositoryError> {
        let rows = sqlx::query_as::<_, ServiceRow>(&format!(
            "{SERVICE_SELECT} WHERE s.is_active = 1 ORDER BY s.created_at DESC, s.id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CampusServiceWithAuthor::from).collect())
    }

    async fn count_services(&self) -> Result<u64, RepositoryError> {
        count(&self.pool, "services").await
    }
}
