//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. Request ID (add unique ID to each request)
//! 3. `TraceLayer` (request tracing)
//! 4. Security headers
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Rate limiting on login and authenticated writes (governor)
//!
//! Extractors: [`RequireAuth`] / [`OptionalAuth`] for Supabase bearer tokens,
//! [`OptionalShopifyCustomer`] for the Shopify customer token in the session.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod shopify_customer;

pub use auth::{AuthRejection, OptionalAuth, RequireAuth};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
pub use shopify_customer::{
    OptionalShopifyCustomer, clear_shopify_customer_token, set_shopify_customer_token,
};
