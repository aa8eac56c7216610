//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::checkout::CheckoutService;
use crate::config::StorefrontConfig;
use crate::db::PgReviewStore;
use crate::services::{AuthError, ReviewService, SupabaseAuthClient, TokenVerifier};
use crate::shopify::{ShopifyError, StorefrontClient};

/// Error building the application's API clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("shopify client: {0}")]
    Shopify(#[from] ShopifyError),
    #[error("supabase client: {0}")]
    Auth(#[from] AuthError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    storefront: StorefrontClient,
    checkout: CheckoutService,
    verifier: Arc<dyn TokenVerifier>,
    reviews: ReviewService,
}

impl AppState {
    /// Create a new application state with production clients.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let storefront = StorefrontClient::new(&config.shopify)?;
        let checkout = CheckoutService::new(
            Arc::new(storefront.clone()),
            Arc::new(storefront.clone()),
            config.checkout.custom_domain.clone(),
        );
        let verifier = Arc::new(SupabaseAuthClient::new(&config.supabase)?);
        let reviews = ReviewService::new(Arc::new(PgReviewStore::new(pool.clone())));

        Ok(Self::from_parts(
            config, pool, storefront, checkout, verifier, reviews,
        ))
    }

    /// Assemble state from already-built services.
    #[must_use]
    pub fn from_parts(
        config: StorefrontConfig,
        pool: PgPool,
        storefront: StorefrontClient,
        checkout: CheckoutService,
        verifier: Arc<dyn TokenVerifier>,
        reviews: ReviewService,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                storefront,
                checkout,
                verifier,
                reviews,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Shopify Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }

    /// Bearer token verifier used by the auth extractors.
    #[must_use]
    pub fn verifier(&self) -> &dyn TokenVerifier {
        self.inner.verifier.as_ref()
    }

    #[must_use]
    pub fn reviews(&self) -> &ReviewService {
        &self.inner.reviews
    }
}
