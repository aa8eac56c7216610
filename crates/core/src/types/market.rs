//! Markets: the country, currency, and locale a shopper browses in.
//!
//! Price display mirrors what browsers produce with `Intl.NumberFormat` for
//! the supported locales, so server-rendered and client-rendered prices agree.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::price::{CurrencyCode, Price};

/// No-break space placed between an amount and a trailing symbol.
const NBSP: char = '\u{a0}';
/// Narrow no-break space used as the French thousands separator.
const NNBSP: char = '\u{202f}';

/// Errors that can occur when parsing a [`CountryCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CountryCodeError {
    /// The value is not two ASCII letters.
    #[error("country code must be two ASCII letters, got {0:?}")]
    Invalid(String),
}

/// ISO 3166-1 alpha-2 country code, stored uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode([u8; 2]);

impl CountryCode {
    /// Parse a country code, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error unless the trimmed input is exactly two ASCII letters.
    pub fn parse(s: &str) -> Result<Self, CountryCodeError> {
        match s.trim().as_bytes() {
            [a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => {
                Ok(Self([a.to_ascii_uppercase(), b.to_ascii_uppercase()]))
            }
            _ => Err(CountryCodeError::Invalid(s.to_owned())),
        }
    }

    const fn from_static(code: [u8; 2]) -> Self {
        Self(code)
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CountryCode {
    type Err = CountryCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = CountryCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.as_str().to_owned()
    }
}

/// Display locales supported by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "en-CA")]
    EnCa,
    #[serde(rename = "en-GB")]
    EnGb,
    #[serde(rename = "en-AU")]
    EnAu,
    #[serde(rename = "de-DE")]
    DeDe,
    #[serde(rename = "fr-FR")]
    FrFr,
}

impl Locale {
    /// BCP 47 tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::EnCa => "en-CA",
            Self::EnGb => "en-GB",
            Self::EnAu => "en-AU",
            Self::DeDe => "de-DE",
            Self::FrFr => "fr-FR",
        }
    }

    const fn is_english(self) -> bool {
        matches!(self, Self::EnUs | Self::EnCa | Self::EnGb | Self::EnAu)
    }

    const fn separators(self) -> (char, char) {
        match self {
            Self::EnUs | Self::EnCa | Self::EnGb | Self::EnAu => (',', '.'),
            Self::DeDe => ('.', ','),
            Self::FrFr => (NNBSP, ','),
        }
    }
}

/// A configured country/currency/locale tuple used to format prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    /// Country the market serves.
    pub country_code: CountryCode,
    /// Currency prices are shown in.
    pub currency_code: CurrencyCode,
    /// Locale used for number formatting.
    pub locale: Locale,
}

impl Market {
    /// Built-in markets. The first entry is the default.
    pub const ALL: [Self; 6] = [
        Self::new(*b"US", CurrencyCode::USD, Locale::EnUs),
        Self::new(*b"CA", CurrencyCode::CAD, Locale::EnCa),
        Self::new(*b"GB", CurrencyCode::GBP, Locale::EnGb),
        Self::new(*b"AU", CurrencyCode::AUD, Locale::EnAu),
        Self::new(*b"DE", CurrencyCode::EUR, Locale::DeDe),
        Self::new(*b"FR", CurrencyCode::EUR, Locale::FrFr),
    ];

    const fn new(country: [u8; 2], currency_code: CurrencyCode, locale: Locale) -> Self {
        Self {
            country_code: CountryCode::from_static(country),
            currency_code,
            locale,
        }
    }

    /// The default market (United States).
    #[must_use]
    pub const fn default_market() -> Self {
        Self::new(*b"US", CurrencyCode::USD, Locale::EnUs)
    }

    /// Find the market for a country, falling back to the default market.
    #[must_use]
    pub fn for_country(country: &CountryCode) -> Self {
        Self::ALL
            .into_iter()
            .find(|m| m.country_code == *country)
            .unwrap_or_else(Self::default_market)
    }

    /// Find the market for a raw country string, falling back to the default.
    #[must_use]
    pub fn for_country_str(country: &str) -> Self {
        CountryCode::parse(country).map_or_else(|_| Self::default_market(), |c| Self::for_country(&c))
    }

    /// Format a price for display in this market's locale.
    ///
    /// The price keeps its own currency; convert first with
    /// [`ExchangeRates`](super::price::ExchangeRates) to show local prices.
    #[must_use]
    pub fn format_price(&self, price: &Price) -> String {
        let rounded = price
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let (group, decimal) = self.locale.separators();
        let digits = format_digits(rounded.abs(), group, decimal);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let symbol = self.symbol_for(price.currency_code);

        if self.locale.is_english() {
            format!("{sign}{symbol}{digits}")
        } else {
            format!("{sign}{digits}{NBSP}{symbol}")
        }
    }

    fn symbol_for(&self, currency: CurrencyCode) -> &'static str {
        match currency {
            CurrencyCode::GBP => "£",
            CurrencyCode::EUR => "€",
            dollar if self.locale.is_english() && dollar == self.currency_code => "$",
            CurrencyCode::USD if self.locale.is_english() => "US$",
            CurrencyCode::USD => "$",
            CurrencyCode::CAD => "CA$",
            CurrencyCode::AUD if self.locale.is_english() => "A$",
            CurrencyCode::AUD => "AU$",
        }
    }
}

impl Default for Market {
    fn default() -> Self {
        Self::default_market()
    }
}

impl Price {
    /// Format this price for display in a market.
    #[must_use]
    pub fn format(&self, market: &Market) -> String {
        market.format_price(self)
    }
}

/// Render a non-negative amount with exactly two fraction digits.
fn format_digits(amount: Decimal, group: char, decimal: char) -> String {
    let fixed = format!("{amount:.2}");
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let len = int_part.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(group);
        }
        grouped.push(ch);
    }

    format!("{grouped}{decimal}{frac_part}")
}
