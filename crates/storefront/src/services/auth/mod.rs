//! Supabase access token verification.
//!
//! Tokens are checked against the project's `GET /auth/v1/user` endpoint,
//! which validates signature and expiry server-side and returns the user.
//! The result is a typed [`AuthContext`] handed to handlers by the
//! [`RequireAuth`](crate::middleware::RequireAuth) extractor.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::SupabaseConfig;

/// The authenticated Supabase user behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Supabase user id (`auth.users.id`).
    pub user_id: Uuid,
    pub email: Option<String>,
    /// Postgres role claimed by the token, usually `authenticated`.
    pub role: String,
}

/// Verifies bearer tokens.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Resolve a bearer token to the user it belongs to.
    async fn verify(&self, token: &str) -> Result<AuthContext, AuthError>;
}

/// `GET /auth/v1/user` response (only the fields we use).
#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: Uuid,
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

impl From<SupabaseUser> for AuthContext {
    fn from(user: SupabaseUser) -> Self {
        Self {
            user_id: user.id,
            email: user.email.filter(|e| !e.is_empty()),
            role: user
                .role
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| "authenticated".to_string()),
        }
    }
}

/// Client for Supabase Auth.
#[derive(Clone)]
pub struct SupabaseAuthClient {
    inner: Arc<SupabaseAuthClientInner>,
}

struct SupabaseAuthClientInner {
    client: reqwest::Client,
    user_endpoint: String,
    anon_key: String,
}

impl SupabaseAuthClient {
    /// Create a new Supabase auth client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &SupabaseConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(SupabaseAuthClientInner {
                client,
                user_endpoint: format!("{}/auth/v1/user", config.url.trim_end_matches('/')),
                anon_key: config.anon_key.expose_secret().to_string(),
            }),
        })
    }

    /// The user endpoint tokens are verified against.
    #[must_use]
    pub fn user_endpoint(&self) -> &str {
        &self.inner.user_endpoint
    }
}

#[async_trait]
impl TokenVerifier for SupabaseAuthClient {
    #[instrument(skip(self, token))]
    async fn verify(&self, token: &str) -> Result<AuthContext, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let response = self
            .inner
            .client
            .get(&self.inner.user_endpoint)
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let user: SupabaseUser = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Provider(format!("malformed user response: {e}")))?;
                debug!(user_id = %user.id, "Token verified");
                Ok(user.into())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::InvalidToken),
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(
                    status = %status,
                    body = %body.chars().take(200).collect::<String>(),
                    "Supabase auth returned unexpected status"
                );
                Err(AuthError::Provider(format!("unexpected status {status}")))
            }
        }
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
///
/// # Errors
///
/// Returns `AuthError::InvalidScheme` for non-bearer schemes,
/// `AuthError::MissingToken` for an empty token, and
/// `AuthError::InvalidToken` when the token contains whitespace.
pub fn bearer_token(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::MissingToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }
    let token = parts.next().ok_or(AuthError::MissingToken)?;
    if parts.next().is_some() {
        return Err(AuthError::InvalidToken);
    }
    Ok(token)
}
