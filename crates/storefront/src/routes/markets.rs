//! Market and price formatting endpoints.

use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::{CurrencyCode, Market, Price};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query of `GET /api/prices/format`.
#[derive(Debug, Deserialize)]
pub struct FormatPriceQuery {
    /// Decimal amount, e.g. `1234.5`.
    pub amount: String,
    /// Currency of `amount`; defaults to the shop's base currency.
    pub currency: Option<String>,
    /// Country whose market to format for; defaults to the default market.
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedPrice {
    pub amount: Decimal,
    pub currency_code: CurrencyCode,
    pub formatted: String,
    pub market: Market,
}

/// List the built-in markets. The first is the default.
///
/// # Route
///
/// `GET /api/markets`
pub async fn list() -> Json<[Market; 6]> {
    Json(Market::ALL)
}

/// Convert a price into a market's currency and format it.
///
/// Prices stay in their own currency when no exchange rate is configured.
///
/// # Route
///
/// `GET /api/prices/format?amount=&currency=&country=`
pub async fn format_price(
    State(state): State<AppState>,
    Query(query): Query<FormatPriceQuery>,
) -> Result<Json<FormattedPrice>> {
    let rates = &state.config().markets.exchange_rates;
    let currency = query
        .currency
        .as_deref()
        .map_or_else(|| rates.base().code(), str::trim);
    let price = Price::parse(&query.amount, currency).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let market = query
        .country
        .as_deref()
        .map_or_else(Market::default_market, Market::for_country_str);

    let shown = rates.convert(price, market.currency_code).unwrap_or_else(|| {
        tracing::debug!(
            from = %price.currency_code,
            to = %market.currency_code,
            "No exchange rate, formatting in original currency"
        );
        price
    });

    Ok(Json(FormattedPrice {
        amount: shown.amount,
        currency_code: shown.currency_code,
        formatted: market.format_price(&shown),
        market,
    }))
}
