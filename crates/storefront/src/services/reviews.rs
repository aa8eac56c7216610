//! Product reviews, helpful votes, and social share tracking.
//!
//! Storage sits behind the [`ReviewStore`] port ([`PgReviewStore`] in
//! production). [`ReviewService`] validates input, clamps paging, and turns
//! repository failures into [`ReviewError`]s the HTTP layer can map.
//!
//! [`PgReviewStore`]: crate::db::PgReviewStore

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use shopfront_core::{GidError, ReviewId, SharePlatform, ShopifyGid};

use crate::db::RepositoryError;

/// Highest star rating.
pub const MAX_RATING: i16 = 5;
/// Longest accepted review title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;
/// Longest accepted review body, in characters.
pub const MAX_BODY_CHARS: usize = 5000;
/// Page size when the caller does not pass one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: i64 = 50;

/// A stored product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    /// Product GID.
    pub product_id: String,
    /// Supabase user id of the author.
    pub author_id: Uuid,
    pub rating: i16,
    pub title: Option<String>,
    pub body: String,
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate rating for one product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub review_count: i64,
    /// Mean rating rounded to 2 decimal places; `None` with no reviews.
    pub average_rating: Option<Decimal>,
}

/// Review submission as received from a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub product_id: String,
    pub rating: i16,
    #[serde(default)]
    pub title: Option<String>,
    pub body: String,
}

/// A review that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReview {
    pub product_id: ShopifyGid,
    pub rating: i16,
    pub title: Option<String>,
    pub body: String,
}

impl NewReview {
    /// Check rating range, text lengths, and the product id.
    ///
    /// Title and body are trimmed; a blank title is stored as `None`.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Validation` or `ReviewError::InvalidProduct`.
    pub fn validate(self) -> Result<ValidatedReview, ReviewError> {
        let product_id = ShopifyGid::parse_resource(self.product_id.trim(), ShopifyGid::PRODUCT)?;

        if !(1..=MAX_RATING).contains(&self.rating) {
            return Err(ReviewError::Validation(format!(
                "rating must be between 1 and {MAX_RATING}"
            )));
        }

        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if title.as_ref().is_some_and(|t| t.chars().count() > MAX_TITLE_CHARS) {
            return Err(ReviewError::Validation(format!(
                "title must be at most {MAX_TITLE_CHARS} characters"
            )));
        }

        let body = self.body.trim().to_string();
        if body.is_empty() {
            return Err(ReviewError::Validation("review body is required".to_string()));
        }
        if body.chars().count() > MAX_BODY_CHARS {
            return Err(ReviewError::Validation(format!(
                "body must be at most {MAX_BODY_CHARS} characters"
            )));
        }

        Ok(ValidatedReview {
            product_id,
            rating: self.rating,
            title,
            body,
        })
    }
}

/// Result of a helpful vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Vote stored; the review's recomputed helpful count.
    Recorded { helpful_count: i32 },
    /// The voter wrote the review.
    OwnReview,
}

/// Errors surfaced by the review API.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid product id: {0}")]
    InvalidProduct(#[from] GidError),

    #[error("review not found")]
    NotFound,

    #[error("cannot vote on your own review")]
    OwnReview,

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ReviewError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

/// Storage for reviews, votes, and shares.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Insert or replace the author's review of a product.
    async fn upsert_review(
        &self,
        author: Uuid,
        review: &ValidatedReview,
    ) -> Result<Review, RepositoryError>;

    /// Reviews of a product, newest first.
    async fn list_reviews(
        &self,
        product_id: &ShopifyGid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, RepositoryError>;

    async fn review_summary(&self, product_id: &ShopifyGid) -> Result<ReviewSummary, RepositoryError>;

    /// Record or replace a vote and recompute the helpful count.
    ///
    /// Returns `RepositoryError::NotFound` for an unknown review.
    async fn vote(
        &self,
        review_id: ReviewId,
        voter: Uuid,
        helpful: bool,
    ) -> Result<VoteOutcome, RepositoryError>;

    /// Record a share; `false` when this user already shared the product there.
    async fn record_share(
        &self,
        user: Uuid,
        product_id: &ShopifyGid,
        platform: SharePlatform,
    ) -> Result<bool, RepositoryError>;
}

/// A page of reviews with the product's summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPage {
    pub reviews: Vec<Review>,
    pub summary: ReviewSummary,
    pub limit: i64,
    pub offset: i64,
}

/// Review API operations over a [`ReviewStore`].
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn ReviewStore>,
}

impl ReviewService {
    #[must_use]
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self { store }
    }

    /// Validate and store a review.
    ///
    /// # Errors
    ///
    /// Returns validation errors or repository failures.
    #[instrument(skip(self, review), fields(author = %author))]
    pub async fn submit(&self, author: Uuid, review: NewReview) -> Result<Review, ReviewError> {
        let review = review.validate()?;
        Ok(self.store.upsert_review(author, &review).await?)
    }

    /// List a product's reviews. `limit` is clamped to `1..=50`.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidProduct` or repository failures.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        product_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<ReviewPage, ReviewError> {
        let product = ShopifyGid::parse_resource(product_id, ShopifyGid::PRODUCT)?;
        let limit = clamp_limit(limit);
        let offset = offset.unwrap_or(0).max(0);

        let reviews = self.store.list_reviews(&product, limit, offset).await?;
        let summary = self.store.review_summary(&product).await?;

        Ok(ReviewPage {
            reviews,
            summary,
            limit,
            offset,
        })
    }

    /// Vote a review helpful or not.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::NotFound`, `ReviewError::OwnReview`, or
    /// repository failures.
    #[instrument(skip(self), fields(review_id = %review_id))]
    pub async fn vote(
        &self,
        review_id: ReviewId,
        voter: Uuid,
        helpful: bool,
    ) -> Result<i32, ReviewError> {
        match self.store.vote(review_id, voter, helpful).await? {
            VoteOutcome::Recorded { helpful_count } => Ok(helpful_count),
            VoteOutcome::OwnReview => Err(ReviewError::OwnReview),
        }
    }

    /// Record a social share of a product.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::InvalidProduct` or repository failures.
    #[instrument(skip(self))]
    pub async fn share(
        &self,
        user: Uuid,
        product_id: &str,
        platform: SharePlatform,
    ) -> Result<bool, ReviewError> {
        let product = ShopifyGid::parse_resource(product_id, ShopifyGid::PRODUCT)?;
        Ok(self.store.record_share(user, &product, platform).await?)
    }
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}
