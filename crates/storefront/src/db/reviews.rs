//! Review repository for database operations.
//!
//! Queries are checked at runtime (`sqlx::query_as`) so the crate builds
//! without a live database.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use shopfront_core::{ReviewId, SharePlatform, ShopifyGid};

use super::RepositoryError;
use crate::services::reviews::{Review, ReviewStore, ReviewSummary, ValidatedReview, VoteOutcome};

const REVIEW_COLUMNS: &str =
    "id, product_id, author_id, rating, title, body, helpful_count, created_at, updated_at";

/// `PostgreSQL`-backed [`ReviewStore`].
#[derive(Clone)]
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn upsert_review(
        &self,
        author: Uuid,
        review: &ValidatedReview,
    ) -> Result<Review, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO storefront.review (product_id, author_id, rating, title, body)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (product_id, author_id) DO UPDATE
            SET rating = EXCLUDED.rating,
                title = EXCLUDED.title,
                body = EXCLUDED.body,
                updated_at = now()
            RETURNING {REVIEW_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, Review>(&sql)
            .bind(review.product_id.to_string())
            .bind(author)
            .bind(review.rating)
            .bind(review.title.as_deref())
            .bind(&review.body)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn list_reviews(
        &self,
        product_id: &ShopifyGid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {REVIEW_COLUMNS}
            FROM storefront.review
            WHERE product_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "
        );

        let rows = sqlx::query_as::<_, Review>(&sql)
            .bind(product_id.to_string())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn review_summary(&self, product_id: &ShopifyGid) -> Result<ReviewSummary, RepositoryError> {
        let (review_count, average_rating): (i64, Option<Decimal>) = sqlx::query_as(
            r"
            SELECT COUNT(*), ROUND(AVG(rating)::numeric, 2)
            FROM storefront.review
            WHERE product_id = $1
            ",
        )
        .bind(product_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(ReviewSummary {
            review_count,
            average_rating,
        })
    }

    async fn vote(
        &self,
        review_id: ReviewId,
        voter: Uuid,
        helpful: bool,
    ) -> Result<VoteOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent voters on the same review.
        let author: Option<Uuid> = sqlx::query_scalar(
            "SELECT author_id FROM storefront.review WHERE id = $1 FOR UPDATE",
        )
        .bind(review_id)
        .fetch_optional(&mut *tx)
        .await?;

        let author = author.ok_or(RepositoryError::NotFound)?;
        if author == voter {
            return Ok(VoteOutcome::OwnReview);
        }

        sqlx::query(
            r"
            INSERT INTO storefront.review_vote (review_id, voter_id, helpful)
            VALUES ($1, $2, $3)
            ON CONFLICT (review_id, voter_id) DO UPDATE
            SET helpful = EXCLUDED.helpful,
                updated_at = now()
            ",
        )
        .bind(review_id)
        .bind(voter)
        .bind(helpful)
        .execute(&mut *tx)
        .await?;

        let helpful_count: i32 = sqlx::query_scalar(
            r"
            UPDATE storefront.review
            SET helpful_count = (
                SELECT COUNT(*)::int
                FROM storefront.review_vote
                WHERE review_id = $1 AND helpful
            )
            WHERE id = $1
            RETURNING helpful_count
            ",
        )
        .bind(review_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(VoteOutcome::Recorded { helpful_count })
    }

    async fn record_share(
        &self,
        user: Uuid,
        product_id: &ShopifyGid,
        platform: SharePlatform,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO storefront.social_share (user_id, product_id, platform)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id, platform) DO NOTHING
            ",
        )
        .bind(user)
        .bind(product_id.to_string())
        .bind(platform.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
