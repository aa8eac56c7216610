//! Integration tests for checkout preparation and return handling.
//!
//! The first half exercises the storefront library directly; the second
//! half needs a running storefront (see the crate docs).

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use serde_json::json;
use shopfront_core::CheckoutStatus;
use shopfront_integration_tests::TestContext;
use shopfront_storefront::checkout::{classify_return, extract_checkout_id, transform_checkout_url};

const CHECKOUT_URL: &str = "https://shop.myshopify.com/1234/checkouts/abc123?key=k";

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

// =============================================================================
// Library Tests
// =============================================================================

#[test]
fn test_checkout_id_and_domain_agree() {
    let transformed = transform_checkout_url(CHECKOUT_URL, Some("checkout.example.com"));
    assert_eq!(
        transformed,
        "https://checkout.example.com/1234/checkouts/abc123?key=k"
    );

    // Rewriting the host keeps the checkout id extractable.
    assert_eq!(
        extract_checkout_id(&transformed),
        extract_checkout_id(CHECKOUT_URL)
    );
    assert_eq!(
        extract_checkout_id(CHECKOUT_URL).unwrap().to_string(),
        "gid://shopify/Checkout/abc123"
    );
}

#[test]
fn test_return_round_trip_to_confirmation() {
    let info = classify_return(&params(&[("order_id", "1001"), ("email", "a@b.co")]));
    assert!(info.is_return);
    assert_eq!(info.status, Some(CheckoutStatus::Success));
    assert_eq!(info.customer_email.as_deref(), Some("a@b.co"));
    assert_eq!(
        info.redirect_to.as_deref(),
        Some("/order-confirmation?order_id=1001")
    );
}

#[test]
fn test_plain_visit_is_not_a_return() {
    let info = classify_return(&params(&[("utm_source", "newsletter")]));
    assert!(!info.is_return);
    assert_eq!(info.status, None);
    assert_eq!(info.redirect_to, None);
}

// =============================================================================
// Live Server Tests
// =============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_guest_prepare_returns_checkout_url() {
    let ctx = TestContext::from_env();
    let response = ctx
        .client
        .post(ctx.url("/api/checkout/prepare"))
        .json(&json!({ "checkoutUrl": CHECKOUT_URL }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["checkoutUrl"].as_str().unwrap().contains("/checkouts/abc123"));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_guest_prepare_with_login_requires_auth() {
    let ctx = TestContext::from_env();
    let response = ctx
        .client
        .post(ctx.url("/api/checkout/prepare"))
        .json(&json!({ "checkoutUrl": CHECKOUT_URL, "redirectToLogin": true }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["requiresAuth"], true);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_redirect_refuses_foreign_host() {
    let ctx = TestContext::from_env();
    let response = ctx
        .client
        .get(ctx.url(&format!(
            "/checkout?url={}",
            urlencoding::encode("https://evil.test/checkouts/1")
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 303);
    assert_eq!(response.headers()["location"], "/cart");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_cancelled_return_redirects_to_cart() {
    let ctx = TestContext::from_env();
    let response = ctx
        .client
        .get(ctx.url("/checkout/return?cancelled=true"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 303);
    assert_eq!(response.headers()["location"], "/cart?cancelled=true");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_logout_without_login() {
    let ctx = TestContext::from_env();
    let response = ctx
        .client
        .post(ctx.url("/api/account/logout"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": true }));
}
