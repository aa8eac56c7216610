//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod gid;
pub mod id;
pub mod market;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use gid::{GidError, ShopifyGid};
pub use id::*;
pub use market::{CountryCode, CountryCodeError, Locale, Market};
pub use price::{CurrencyCode, ExchangeRates, Price, PriceError};
pub use status::*;
