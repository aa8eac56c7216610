//! Review, helpful vote, and social share endpoints.
//!
//! Reads are public. Writes need a Supabase bearer token; the author or
//! voter is always the verified user, never a client-supplied id.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use shopfront_core::{ReviewId, SharePlatform, ShopifyGid};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::services::reviews::{NewReview, Review, ReviewPage};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A page of reviews, plus the caller's own review when signed in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListResponse {
    #[serde(flatten)]
    pub page: ReviewPage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_review_id: Option<ReviewId>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub helpful: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub helpful_count: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub product_id: String,
    pub platform: SharePlatform,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub recorded: bool,
    /// This user had already shared the product on this platform.
    pub already_shared: bool,
}

/// Accept a full product GID or its bare numeric id.
fn product_gid(raw: &str) -> String {
    let raw = raw.trim();
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        ShopifyGid::new(ShopifyGid::PRODUCT, raw).to_string()
    } else {
        raw.to_string()
    }
}

/// `GET /api/products/{product_id}/reviews`
///
/// Public; a valid bearer token additionally marks the caller's own review.
pub async fn list(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    Path(product_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ReviewListResponse>> {
    let page = state
        .reviews()
        .list(&product_gid(&product_id), query.limit, query.offset)
        .await?;

    let viewer_review_id = viewer.and_then(|user| {
        page.reviews
            .iter()
            .find(|review| review.author_id == user.user_id)
            .map(|review| review.id)
    });

    Ok(Json(ReviewListResponse {
        page,
        viewer_review_id,
    }))
}

/// Create the caller's review of a product, or replace it.
///
/// `POST /api/reviews`
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(mut review): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>)> {
    review.product_id = product_gid(&review.product_id);
    let review = state.reviews().submit(user.user_id, review).await?;
    add_breadcrumb("reviews", "Review submitted", Some(&[("product_id", &review.product_id)]));
    Ok((StatusCode::CREATED, Json(review)))
}

/// `POST /api/reviews/{id}/vote`
pub async fn vote(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
    Json(request): Json<VoteRequest>,
) -> Result<Json<VoteResponse>> {
    let helpful_count = state
        .reviews()
        .vote(ReviewId::new(id), user.user_id, request.helpful)
        .await?;
    Ok(Json(VoteResponse { helpful_count }))
}

/// `POST /api/shares`
pub async fn share(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<ShareRequest>,
) -> Result<Json<ShareResponse>> {
    let recorded = state
        .reviews()
        .share(user.user_id, &product_gid(&request.product_id), request.platform)
        .await?;
    Ok(Json(ShareResponse {
        recorded,
        already_shared: !recorded,
    }))
}
