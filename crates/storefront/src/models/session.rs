//! Session-related types.
//!
//! Keys for values stored in the visitor's session.

/// Session keys for authentication data.
pub mod keys {
    /// Key for the Shopify customer access token issued at login.
    pub const SHOPIFY_CUSTOMER_TOKEN: &str = "shopify_customer_token";
}
