//! Shopify customer session extractor.
//!
//! The Shopify customer access token obtained at login lives in the
//! visitor's session. Checkout reads it to resolve the customer.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::session_keys;
use crate::shopify::CustomerAccessToken;

/// Extractor that optionally gets the Shopify customer token.
///
/// Yields `None` for guests, for sessions that cannot be read, and for
/// expired tokens.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     OptionalShopifyCustomer(token): OptionalShopifyCustomer,
/// ) -> impl IntoResponse {
///     match token {
///         Some(t) => "Customer signed in",
///         None => "Guest visitor",
///     }
/// }
/// ```
pub struct OptionalShopifyCustomer(pub Option<CustomerAccessToken>);

impl OptionalShopifyCustomer {
    /// The raw access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.0.as_ref().map(|t| t.access_token.as_str())
    }
}

impl<S> FromRequestParts<S> for OptionalShopifyCustomer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CustomerAccessToken>(session_keys::SHOPIFY_CUSTOMER_TOKEN)
                .await
                .ok()
                .flatten()
                .filter(|token| !token.is_expired()),
            None => None,
        };

        Ok(Self(token))
    }
}

/// Helper to set the Shopify customer token in the session.
///
/// Cycles the session id first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_shopify_customer_token(
    session: &Session,
    token: &CustomerAccessToken,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::SHOPIFY_CUSTOMER_TOKEN, token)
        .await
}

/// Helper to clear the Shopify customer token from the session.
///
/// Returns the token that was stored, so it can be revoked upstream.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_shopify_customer_token(
    session: &Session,
) -> Result<Option<CustomerAccessToken>, tower_sessions::session::Error> {
    session
        .remove::<CustomerAccessToken>(session_keys::SHOPIFY_CUSTOMER_TOKEN)
        .await
}
