//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! Pure tests run with the rest of the workspace. Tests against a live
//! storefront are `#[ignore]`d; start the server, then:
//!
//! ```bash
//! STOREFRONT_TEST_URL=http://localhost:3000 cargo test -p shopfront-integration-tests -- --ignored
//! ```
//!
//! Review write tests also need `STOREFRONT_TEST_BEARER`, a Supabase access
//! token for a throwaway test user, and `STOREFRONT_TEST_PRODUCT`, a product
//! GID to review.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Checkout URL preparation and return classification
//! - `markets_api` - Market listing and price formatting
//! - `reviews_api` - Reviews, helpful votes and shares

use reqwest::Client;

/// Default storefront address when `STOREFRONT_TEST_URL` is unset.
pub const DEFAULT_STOREFRONT_URL: &str = "http://localhost:3000";

/// Shared handle for tests that talk to a running storefront.
pub struct TestContext {
    pub client: Client,
    pub storefront_url: String,
    /// Supabase access token for review writes, if configured.
    pub bearer: Option<String>,
}

impl TestContext {
    /// Build a context from the environment.
    ///
    /// The client keeps cookies so login sessions carry across requests and
    /// never follows redirects, so tests can inspect `Location`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn from_env() -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        let storefront_url = std::env::var("STOREFRONT_TEST_URL")
            .unwrap_or_else(|_| DEFAULT_STOREFRONT_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            client,
            storefront_url,
            bearer: std::env::var("STOREFRONT_TEST_BEARER").ok(),
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// Product GID used by review tests.
    #[must_use]
    pub fn test_product() -> String {
        std::env::var("STOREFRONT_TEST_PRODUCT")
            .unwrap_or_else(|_| "gid://shopify/Product/1".to_string())
    }
}
