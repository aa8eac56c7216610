//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are [`rust_decimal::Decimal`] in the currency's standard unit
//! (dollars, not cents). Conversion between currencies goes through
//! [`ExchangeRates`], which holds rates relative to the shop's base currency.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of minor-unit digits kept after conversion.
const MINOR_UNITS: u32 = 2;

/// Errors that can occur when parsing prices, currencies, or rate tables.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Currency code is not one the storefront sells in.
    #[error("unsupported currency code: {0}")]
    UnsupportedCurrency(String),
    /// Amount is not a decimal number.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// Exchange rate entry is malformed or not positive.
    #[error("invalid exchange rate entry: {0}")]
    InvalidRate(String),
}

/// ISO 4217 currency codes the storefront sells in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[allow(clippy::upper_case_acronyms)]
pub enum CurrencyCode {
    #[default]
    USD,
    CAD,
    GBP,
    AUD,
    EUR,
}

impl CurrencyCode {
    /// All supported currencies.
    pub const ALL: [Self; 5] = [Self::USD, Self::CAD, Self::GBP, Self::AUD, Self::EUR];

    /// The ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::CAD => "CAD",
            Self::GBP => "GBP",
            Self::AUD => "AUD",
            Self::EUR => "EUR",
        }
    }

    /// Whether the currency is written with a bare `$`.
    #[must_use]
    pub const fn is_dollar(self) -> bool {
        matches!(self, Self::USD | Self::CAD | Self::AUD)
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.code() == upper)
            .ok_or_else(|| PriceError::UnsupportedCurrency(s.to_owned()))
    }
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Parse a price from Shopify's `MoneyV2` string representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not a decimal or the currency is
    /// unsupported.
    pub fn parse(amount: &str, currency_code: &str) -> Result<Self, PriceError> {
        let amount = amount
            .trim()
            .parse::<Decimal>()
            .map_err(|_| PriceError::InvalidAmount(amount.to_owned()))?;
        Ok(Self::new(amount, currency_code.parse()?))
    }

    /// Round to minor units, half away from zero.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self::new(
            self.amount
                .round_dp_with_strategy(MINOR_UNITS, RoundingStrategy::MidpointAwayFromZero),
            self.currency_code,
        )
    }
}

/// Exchange rates relative to the shop's base currency.
///
/// A rate `r` for currency `C` means one unit of the base currency buys `r`
/// units of `C`. The base currency always has rate 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRates {
    base: CurrencyCode,
    rates: HashMap<CurrencyCode, Decimal>,
}

impl ExchangeRates {
    /// Create an empty rate table for a base currency.
    #[must_use]
    pub fn new(base: CurrencyCode) -> Self {
        Self {
            base,
            rates: HashMap::new(),
        }
    }

    /// Parse `CAD=1.36,EUR=0.92` style rate lists.
    ///
    /// Blank input yields an empty table.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed entries, unknown currencies, or
    /// non-positive rates.
    pub fn parse(base: CurrencyCode, rates: &str) -> Result<Self, PriceError> {
        let mut table = Self::new(base);
        for entry in rates.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (code, rate) = entry
                .split_once('=')
                .ok_or_else(|| PriceError::InvalidRate(entry.to_owned()))?;
            let currency: CurrencyCode = code.parse()?;
            let rate = rate
                .trim()
                .parse::<Decimal>()
                .map_err(|_| PriceError::InvalidRate(entry.to_owned()))?;
            table = table.with_rate(currency, rate)?;
        }
        Ok(table)
    }

    /// Add or replace a rate.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate is not positive.
    pub fn with_rate(mut self, currency: CurrencyCode, rate: Decimal) -> Result<Self, PriceError> {
        if rate <= Decimal::ZERO {
            return Err(PriceError::InvalidRate(format!("{currency}={rate}")));
        }
        self.rates.insert(currency, rate);
        Ok(self)
    }

    /// The base currency.
    #[must_use]
    pub const fn base(&self) -> CurrencyCode {
        self.base
    }

    /// Rate for a currency relative to the base.
    #[must_use]
    pub fn rate(&self, currency: CurrencyCode) -> Option<Decimal> {
        if currency == self.base {
            return Some(Decimal::ONE);
        }
        self.rates.get(&currency).copied()
    }

    /// Convert a price into another currency, rounded to minor units.
    ///
    /// Returns `None` when either currency has no known rate. Converting a
    /// price into its own currency returns it unchanged.
    #[must_use]
    pub fn convert(&self, price: Price, to: CurrencyCode) -> Option<Price> {
        if price.currency_code == to {
            return Some(price);
        }
        let from_rate = self.rate(price.currency_code)?;
        let to_rate = self.rate(to)?;
        let base_amount = price.amount.checked_div(from_rate)?;
        let converted = base_amount.checked_mul(to_rate)?;
        Some(Price::new(converted, to).rounded())
    }
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self::new(CurrencyCode::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_currency_from_str_case_insensitive() {
        assert_eq!("cad".parse::<CurrencyCode>().unwrap(), CurrencyCode::CAD);
        assert!(matches!(
            "JPY".parse::<CurrencyCode>(),
            Err(PriceError::UnsupportedCurrency(_))
        ));
    }

    #[test]
    fn test_price_parse_money_v2() {
        let price = Price::parse("19.99", "USD").unwrap();
        assert_eq!(price.amount, dec("19.99"));
        assert_eq!(price.currency_code, CurrencyCode::USD);
        assert!(Price::parse("abc", "USD").is_err());
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        let price = Price::new(dec("2.345"), CurrencyCode::USD).rounded();
        assert_eq!(price.amount, dec("2.35"));
        let price = Price::new(dec("-2.345"), CurrencyCode::USD).rounded();
        assert_eq!(price.amount, dec("-2.35"));
    }

    #[test]
    fn test_parse_rates() {
        let rates = ExchangeRates::parse(CurrencyCode::USD, "CAD=1.36, EUR=0.92").unwrap();
        assert_eq!(rates.rate(CurrencyCode::CAD), Some(dec("1.36")));
        assert_eq!(rates.rate(CurrencyCode::USD), Some(Decimal::ONE));
        assert_eq!(rates.rate(CurrencyCode::GBP), None);
        assert!(ExchangeRates::parse(CurrencyCode::USD, "").unwrap().rates.is_empty());
    }

    #[test]
    fn test_parse_rates_rejects_bad_entries() {
        assert!(ExchangeRates::parse(CurrencyCode::USD, "CAD").is_err());
        assert!(ExchangeRates::parse(CurrencyCode::USD, "CAD=abc").is_err());
        assert!(ExchangeRates::parse(CurrencyCode::USD, "CAD=0").is_err());
        assert!(ExchangeRates::parse(CurrencyCode::USD, "XYZ=1.2").is_err());
    }

    #[test]
    fn test_convert_from_base() {
        let rates = ExchangeRates::parse(CurrencyCode::USD, "CAD=1.36").unwrap();
        let converted = rates
            .convert(Price::new(dec("10.00"), CurrencyCode::USD), CurrencyCode::CAD)
            .unwrap();
        assert_eq!(converted, Price::new(dec("13.60"), CurrencyCode::CAD));
    }

    #[test]
    fn test_convert_between_non_base() {
        let rates = ExchangeRates::parse(CurrencyCode::USD, "CAD=1.25,EUR=0.5").unwrap();
        let converted = rates
            .convert(Price::new(dec("25"), CurrencyCode::CAD), CurrencyCode::EUR)
            .unwrap();
        assert_eq!(converted.amount, dec("10.00"));
    }

    #[test]
    fn test_convert_unknown_rate() {
        let rates = ExchangeRates::new(CurrencyCode::USD);
        assert!(
            rates
                .convert(Price::new(dec("1"), CurrencyCode::USD), CurrencyCode::GBP)
                .is_none()
        );
        let same = Price::new(dec("1.005"), CurrencyCode::GBP);
        assert_eq!(rates.convert(same, CurrencyCode::GBP), Some(same));
    }
}
