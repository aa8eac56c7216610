//! Integration tests for markets and price formatting.

#![allow(clippy::unwrap_used)]

use shopfront_core::{CurrencyCode, ExchangeRates, Market, Price};
use shopfront_integration_tests::TestContext;

#[test]
fn test_convert_then_format_for_each_market() {
    let rates = ExchangeRates::parse(CurrencyCode::USD, "CAD=1.35,GBP=0.79,AUD=1.52,EUR=0.92")
        .unwrap();
    let price = Price::parse("1234.50", "USD").unwrap();

    for market in Market::ALL {
        let local = rates.convert(price, market.currency_code).unwrap();
        assert_eq!(local.currency_code, market.currency_code);

        let formatted = market.format_price(&local);
        assert!(!formatted.is_empty());
        assert!(formatted.chars().any(|c| c.is_ascii_digit()));
    }
}

#[test]
fn test_unknown_country_falls_back_to_default() {
    assert_eq!(Market::for_country_str("ZZ"), Market::default_market());
    assert_eq!(Market::for_country_str("de").currency_code, CurrencyCode::EUR);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_list_markets() {
    let ctx = TestContext::from_env();
    let response = ctx.client.get(ctx.url("/api/markets")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), Market::ALL.len());
    assert_eq!(body[0]["countryCode"], "US");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_format_price() {
    let ctx = TestContext::from_env();
    let response = ctx
        .client
        .get(ctx.url("/api/prices/format?amount=19.99&currency=USD&country=US"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["formatted"], "$19.99");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_format_price_rejects_bad_amount() {
    let ctx = TestContext::from_env();
    let response = ctx
        .client
        .get(ctx.url("/api/prices/format?amount=twelve"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}
