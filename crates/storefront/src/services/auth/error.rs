//! Authentication error types.

use thiserror::Error;

/// Errors that can occur while verifying a Supabase access token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token on the request.
    #[error("Missing bearer token")]
    MissingToken,

    /// Authorization header present but not a bearer token.
    #[error("Invalid authorization scheme")]
    InvalidScheme,

    /// Supabase rejected the token (expired, revoked, or forged).
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Supabase answered with something other than a user or a rejection.
    #[error("auth provider error: {0}")]
    Provider(String),

    /// HTTP request to Supabase failed.
    #[error("auth provider unreachable: {0}")]
    Http(#[from] reqwest::Error),
}

impl AuthError {
    /// True when the failure is on the provider's side rather than the caller's.
    #[must_use]
    pub const fn is_provider_failure(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::Http(_))
    }
}
