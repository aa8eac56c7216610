//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (database)
//!
//! # Checkout
//! POST /api/checkout/prepare            - Prepare checkout URL (JSON)
//! GET  /checkout?url=&login=            - Prepare and redirect to checkout
//! GET  /checkout/return                 - Classify redirect back from checkout
//!
//! # Account (Shopify customer session)
//! POST /api/account/login               - Exchange credentials for a customer token
//! POST /api/account/logout              - Revoke token and clear session
//!
//! # Markets
//! GET  /api/markets                     - Built-in markets
//! GET  /api/prices/format               - Convert and format a price for a market
//!
//! # Reviews (writes require a Supabase bearer token)
//! GET  /api/products/{product_id}/reviews - Reviews and rating summary
//! POST /api/reviews                     - Create or update own review
//! POST /api/reviews/{id}/vote           - Helpful vote
//! POST /api/shares                      - Record a social share
//! ```

pub mod account;
pub mod checkout;
pub mod markets;
pub mod reviews;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(checkout::redirect))
        .route("/checkout/return", get(checkout::checkout_return))
        .route("/api/checkout/prepare", post(checkout::prepare))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(account::login))
        .layer(auth_rate_limiter())
        .route("/logout", post(account::logout))
}

/// Create the market routes router.
pub fn market_routes() -> Router<AppState> {
    Router::new()
        .route("/markets", get(markets::list))
        .route("/prices/format", get(markets::format_price))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    let writes = Router::new()
        .route("/reviews", post(reviews::submit))
        .route("/reviews/{id}/vote", post(reviews::vote))
        .route("/shares", post(reviews::share))
        .layer(api_rate_limiter());

    Router::new()
        .route("/products/{product_id}/reviews", get(reviews::list))
        .merge(writes)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(checkout_routes())
        .nest("/api/account", account_routes())
        .nest("/api", market_routes().merge(review_routes()))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, Response},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;
    use uuid::Uuid;

    use super::routes;
    use crate::checkout::CheckoutService;
    use crate::checkout::fakes::{FakeResolver, FakeUpdater, UpdateOutcome};
    use crate::config::StorefrontConfig;
    use crate::middleware::create_session_layer;
    use crate::services::ReviewService;
    use crate::services::auth::tests::FakeVerifier;
    use crate::services::reviews::tests::MemoryReviewStore;
    use crate::shopify::{Customer, StorefrontClient};
    use crate::state::AppState;

    pub const TOKEN: &str = "valid-token";

    /// Knobs for the fakes behind the ports.
    pub struct TestApp {
        pub customer: Option<Customer>,
        pub resolver_fails: bool,
        pub outcome: UpdateOutcome,
        pub user_id: Uuid,
        pub auth_provider_down: bool,
    }

    impl Default for TestApp {
        fn default() -> Self {
            Self {
                customer: None,
                resolver_fails: false,
                outcome: UpdateOutcome::Fails,
                user_id: Uuid::new_v4(),
                auth_provider_down: false,
            }
        }
    }

    impl TestApp {
        pub fn state(self) -> AppState {
            let config = StorefrontConfig::for_tests();
            let pool = PgPoolOptions::new()
                .connect_lazy("postgres://localhost/shopfront_test")
                .unwrap();
            let storefront = StorefrontClient::new(&config.shopify).unwrap();
            let checkout = CheckoutService::new(
                Arc::new(FakeResolver {
                    customer: self.customer,
                    fail: self.resolver_fails,
                }),
                Arc::new(FakeUpdater::new(self.outcome)),
                config.checkout.custom_domain.clone(),
            );
            let mut verifier = FakeVerifier::accepting(TOKEN, self.user_id);
            verifier.provider_down = self.auth_provider_down;
            let reviews = ReviewService::new(Arc::new(MemoryReviewStore::default()));

            AppState::from_parts(
                config,
                pool,
                storefront,
                checkout,
                Arc::new(verifier),
                reviews,
            )
        }

        pub fn router(self) -> Router {
            let state = self.state();
            router_for(state)
        }
    }

    pub fn router_for(state: AppState) -> Router {
        let sessions = create_session_layer(MemoryStore::default(), state.config());
        routes().layer(sessions).with_state(state)
    }

    /// Send a request; every request carries a client IP for the rate limiters.
    pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
        app.clone().oneshot(request).await.unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("x-real-ip", "203.0.113.10")
            .body(Body::empty())
            .unwrap()
    }

    pub fn post_json(uri: &str, body: &serde_json::Value, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-real-ip", "203.0.113.10");
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    pub async fn json_body(response: Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
