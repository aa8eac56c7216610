//! Integration tests for the review API against a running storefront.
//!
//! Write tests skip themselves when `STOREFRONT_TEST_BEARER` is unset.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use shopfront_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_list_reviews() {
    let ctx = TestContext::from_env();
    let product = TestContext::test_product();
    let url = ctx.url(&format!(
        "/api/products/{}/reviews?limit=500",
        urlencoding::encode(&product)
    ));

    let response = ctx.client.get(url).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["limit"], 50);
    assert!(body["reviews"].is_array());
    assert!(body["summary"]["reviewCount"].is_i64());
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_submit_requires_bearer() {
    let ctx = TestContext::from_env();
    let response = ctx
        .client
        .post(ctx.url("/api/reviews"))
        .json(&json!({
            "productId": TestContext::test_product(),
            "rating": 5,
            "body": "Anonymous",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore = "Requires running storefront server and STOREFRONT_TEST_BEARER"]
async fn test_submit_update_and_self_vote() {
    let ctx = TestContext::from_env();
    let Some(bearer) = ctx.bearer.clone() else {
        return;
    };
    let product = TestContext::test_product();

    let first = ctx
        .client
        .post(ctx.url("/api/reviews"))
        .bearer_auth(&bearer)
        .json(&json!({ "productId": product, "rating": 4, "body": "Good" }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 201);
    let first: serde_json::Value = first.json().await.unwrap();

    // A second submission replaces the first.
    let second = ctx
        .client
        .post(ctx.url("/api/reviews"))
        .bearer_auth(&bearer)
        .json(&json!({ "productId": product, "rating": 5, "body": "Better" }))
        .send()
        .await
        .unwrap();
    let second: serde_json::Value = second.json().await.unwrap();
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["rating"], 5);

    let vote = ctx
        .client
        .post(ctx.url(&format!("/api/reviews/{}/vote", second["id"])))
        .bearer_auth(&bearer)
        .json(&json!({ "helpful": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(vote.status(), 403);
}

#[tokio::test]
#[ignore = "Requires running storefront server and STOREFRONT_TEST_BEARER"]
async fn test_share_is_idempotent() {
    let ctx = TestContext::from_env();
    let Some(bearer) = ctx.bearer.clone() else {
        return;
    };
    let body = json!({ "productId": TestContext::test_product(), "platform": "email" });

    let mut already_shared = Vec::new();
    for _ in 0..2 {
        let response = ctx
            .client
            .post(ctx.url("/api/shares"))
            .bearer_auth(&bearer)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let json: serde_json::Value = response.json().await.unwrap();
        already_shared.push(json["alreadyShared"].as_bool().unwrap());
    }

    // The second share of the same product and platform is never recorded.
    assert_eq!(already_shared.last(), Some(&true));
}
