//! Shopfront Storefront library.
//!
//! Market-aware checkout preparation, Shopify customer login, and product
//! reviews for a headless Shopify storefront. The binary in `main.rs` wires
//! these modules into an Axum server; keeping them in a library lets the
//! routes be tested in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
