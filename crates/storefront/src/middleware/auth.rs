//! Supabase bearer token extractors.
//!
//! Handlers ask for the caller's identity in their signature instead of
//! reading it off the request:
//!
//! ```rust,ignore
//! async fn create_review(
//!     RequireAuth(user): RequireAuth,
//!     Json(review): Json<NewReview>,
//! ) -> Result<Json<Review>> {
//!     // user.user_id is the verified Supabase user id
//! }
//! ```

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::set_sentry_user;
use crate::services::auth::{AuthContext, AuthError, bearer_token};
use crate::state::AppState;

/// Extractor that requires a valid Supabase access token.
pub struct RequireAuth(pub AuthContext);

/// Extractor that verifies a bearer token when one is sent.
///
/// Missing, malformed, and rejected tokens all yield `None`.
pub struct OptionalAuth(pub Option<AuthContext>);

/// Error returned when authentication is required but not satisfied.
#[derive(Debug)]
pub enum AuthRejection {
    /// No usable credentials (missing, malformed, or rejected token).
    Unauthorized(&'static str),
    /// Supabase could not be asked.
    ProviderUnavailable,
}

impl From<AuthError> for AuthRejection {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => Self::Unauthorized("Missing bearer token"),
            AuthError::InvalidScheme => Self::Unauthorized("Invalid authorization scheme"),
            AuthError::InvalidToken => Self::Unauthorized("Invalid or expired token"),
            AuthError::Provider(_) | AuthError::Http(_) => {
                tracing::warn!(error = %err, "Token verification unavailable");
                Self::ProviderUnavailable
            }
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            Self::ProviderUnavailable => (
                StatusCode::BAD_GATEWAY,
                "Authentication service unavailable",
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn authenticate(parts: &Parts, state: &AppState) -> Result<AuthContext, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidScheme)?;
    let token = bearer_token(header)?;

    let user = state.verifier().verify(token).await?;
    set_sentry_user(&user.user_id, user.email.as_deref());
    Ok(user)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticate(parts, state).await?))
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticate(parts, state).await.ok()))
    }
}
