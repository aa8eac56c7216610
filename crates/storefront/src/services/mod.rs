//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Supabase access token verification
//! - `reviews` - Product reviews, helpful votes and share tracking

pub mod auth;
pub mod reviews;

pub use auth::{AuthContext, AuthError, SupabaseAuthClient, TokenVerifier};
pub use reviews::{ReviewError, ReviewService, ReviewStore};
