//! Checkout preparation for Shopify hosted checkout.
//!
//! The flow resolves the current customer, attaches their buyer identity to
//! the in-progress checkout when possible, and moves the checkout URL onto
//! the configured custom domain. Enhancement is best effort: a failed
//! mutation degrades to the original URL instead of failing the request.
//!
//! Shopify access goes through two ports so the flow can be tested without
//! a network:
//!
//! - [`CustomerResolver`] - who is checking out
//! - [`BuyerIdentityUpdater`] - `checkoutBuyerIdentityUpdate`
//!
//! [`StorefrontClient`](crate::shopify::StorefrontClient) implements both.

mod domain;
mod id;
mod prepare;
mod returns;

pub use domain::transform_checkout_url;
pub use id::extract_checkout_id;
pub use prepare::{
    CheckoutError, CheckoutOptions, CheckoutResult, CheckoutService, Enhancement,
    PreparedCheckout, login_path,
};
pub use returns::{CheckoutReturnInfo, classify_return};

#[cfg(test)]
pub(crate) use prepare::tests as fakes;

use async_trait::async_trait;
use shopfront_core::ShopifyGid;

use crate::shopify::{BuyerIdentity, CheckoutBuyerIdentityUpdate, Customer, ShopifyError};

/// Resolves the customer behind a Shopify customer access token.
#[async_trait]
pub trait CustomerResolver: Send + Sync {
    /// Look up the current customer.
    ///
    /// A missing token resolves to `Ok(None)`.
    async fn current_customer(
        &self,
        access_token: Option<&str>,
    ) -> Result<Option<Customer>, ShopifyError>;
}

/// Attaches a buyer identity to an in-progress checkout.
#[async_trait]
pub trait BuyerIdentityUpdater: Send + Sync {
    /// Run `checkoutBuyerIdentityUpdate`.
    ///
    /// User errors come back in the payload.
    async fn update_buyer_identity(
        &self,
        checkout_id: &ShopifyGid,
        buyer_identity: &BuyerIdentity,
    ) -> Result<CheckoutBuyerIdentityUpdate, ShopifyError>;
}
