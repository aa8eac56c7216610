//! Checkout route handlers.
//!
//! Checkout itself happens on Shopify's hosted checkout. These handlers
//! prepare the URL the browser is sent to and interpret the redirect back.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use crate::checkout::{
    CheckoutError, CheckoutOptions, CheckoutResult, Enhancement, PreparedCheckout, classify_return,
};
use crate::error::add_breadcrumb;
use crate::middleware::OptionalShopifyCustomer;
use crate::state::AppState;

/// Where failed checkouts land.
const CART_PATH: &str = "/cart";

/// Body of `POST /api/checkout/prepare`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareCheckoutRequest {
    pub checkout_url: String,
    #[serde(flatten)]
    pub options: CheckoutOptions,
}

/// Query of `GET /checkout`.
#[derive(Debug, Deserialize)]
pub struct CheckoutRedirectQuery {
    pub url: String,
    /// Require login before checkout.
    #[serde(default)]
    pub login: bool,
}

fn record_enhancement(prepared: &PreparedCheckout) {
    let outcome = match &prepared.enhancement {
        Enhancement::Applied => "applied",
        Enhancement::Skipped(_) => "skipped",
        Enhancement::Degraded(_) => "degraded",
    };
    add_breadcrumb("checkout", "Prepared checkout", Some(&[("enhancement", outcome)]));
}

/// Prepare a checkout URL for the current visitor.
///
/// 200 with the checkout URL (also when enhancement degraded), 401 when login
/// is required, 502 when the customer lookup failed.
#[instrument(skip(state, customer, request))]
pub async fn prepare(
    State(state): State<AppState>,
    customer: OptionalShopifyCustomer,
    Json(request): Json<PrepareCheckoutRequest>,
) -> (StatusCode, Json<CheckoutResult>) {
    let result = state
        .checkout()
        .prepare(&request.checkout_url, customer.access_token(), &request.options)
        .await;

    let status = match &result {
        Ok(prepared) => {
            record_enhancement(prepared);
            StatusCode::OK
        }
        Err(CheckoutError::AuthRequired { .. }) => StatusCode::UNAUTHORIZED,
        Err(err @ CheckoutError::CustomerResolution(_)) => {
            let event_id = sentry::capture_error(err);
            tracing::error!(error = %err, sentry_event_id = %event_id, "Checkout preparation failed");
            StatusCode::BAD_GATEWAY
        }
    };

    (status, Json(CheckoutResult::from(result)))
}

/// Prepare checkout and redirect the browser to it.
///
/// Only Shopify-hosted checkout URLs (or the configured custom domain) are
/// followed; anything else goes back to the cart.
#[instrument(skip(state, customer, query))]
pub async fn redirect(
    State(state): State<AppState>,
    customer: OptionalShopifyCustomer,
    Query(query): Query<CheckoutRedirectQuery>,
) -> Response {
    let custom_domain = state.config().checkout.custom_domain.as_deref();
    let Some(checkout_url) = checkout_url(&query.url, custom_domain) else {
        tracing::warn!(url = %query.url, "Refusing to redirect to non-checkout URL");
        return Redirect::to(CART_PATH).into_response();
    };

    let options = CheckoutOptions {
        redirect_to_login: query.login,
        ..CheckoutOptions::default()
    };

    match state
        .checkout()
        .prepare(checkout_url.as_str(), customer.access_token(), &options)
        .await
    {
        Ok(prepared) => {
            record_enhancement(&prepared);
            Redirect::to(&prepared.checkout_url).into_response()
        }
        Err(CheckoutError::AuthRequired { login_url }) => Redirect::to(&login_url).into_response(),
        Err(e) => {
            tracing::error!("Failed to prepare checkout: {e}");
            Redirect::to(CART_PATH).into_response()
        }
    }
}

/// Classify a redirect back from hosted checkout.
///
/// Sends the browser on when there is a follow-up page, otherwise returns
/// the classification as JSON.
pub async fn checkout_return(Query(params): Query<HashMap<String, String>>) -> Response {
    let info = classify_return(&params);

    if let Some(status) = info.status {
        add_breadcrumb("checkout", "Returned from checkout", Some(&[("status", &status.to_string())]));
    }

    match &info.redirect_to {
        Some(path) => Redirect::to(path).into_response(),
        None => Json(info).into_response(),
    }
}

/// Parse `raw` if it points at Shopify's hosted checkout or our checkout
/// domain.
///
/// The returned URL is the normalized serialization; the raw input may still
/// carry characters that are not valid in a `Location` header.
fn checkout_url(raw: &str, custom_domain: Option<&str>) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "https" | "http") {
        return None;
    }
    let host = url.host_str()?.to_ascii_lowercase();

    let custom_host = custom_domain.map(|d| {
        d.trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_ascii_lowercase()
    });

    let allowed =
        host.ends_with(".myshopify.com") || custom_host.is_some_and(|c| !c.is_empty() && c == host);
    allowed.then_some(url)
}
