//! Storefront API request and response types.
//!
//! Field names follow the GraphQL schema (camelCase on the wire).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfront_core::CountryCode;

// ─────────────────────────────────────────────────────────────────────────────
// Money
// ─────────────────────────────────────────────────────────────────────────────

/// Shopify `MoneyV2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Customer
// ─────────────────────────────────────────────────────────────────────────────

/// A Shopify customer, as seen through a customer access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Customer GID.
    pub id: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number in E.164 format.
    pub phone: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Default shipping address.
    pub default_address: Option<MailingAddress>,
}

impl Customer {
    /// Country of the default address, if known and well-formed.
    #[must_use]
    pub fn country_code(&self) -> Option<CountryCode> {
        self.default_address
            .as_ref()
            .and_then(|address| address.country_code.as_deref())
            .and_then(|code| CountryCode::parse(code).ok())
    }
}

/// A customer mailing address (only the fields checkout needs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailingAddress {
    /// Address GID.
    pub id: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Province/state code.
    pub province_code: Option<String>,
    /// ISO country code.
    #[serde(rename = "countryCodeV2")]
    pub country_code: Option<String>,
    /// Postal/ZIP code.
    pub zip: Option<String>,
}

/// Customer access token issued by `customerAccessTokenCreate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAccessToken {
    /// Token value passed to customer-scoped queries.
    pub access_token: String,
    /// When the token stops working.
    pub expires_at: DateTime<Utc>,
}

impl CustomerAccessToken {
    /// Check if the token is expired (with 60s buffer).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() + chrono::Duration::seconds(60) >= self.expires_at
    }
}

/// Error returned by customer mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUserError {
    /// Path to the input field that caused the error.
    pub field: Option<Vec<String>>,
    /// Error message.
    pub message: String,
    /// Error code.
    pub code: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Checkout
// ─────────────────────────────────────────────────────────────────────────────

/// Buyer identity attached to an in-progress checkout.
///
/// Built fresh from the current customer on every call; absent fields are
/// left out of the mutation input entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerIdentity {
    /// Customer email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Customer phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Country used for checkout pricing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<CountryCode>,
}

impl BuyerIdentity {
    /// Build the identity from whatever customer fields are present.
    ///
    /// Blank email or phone values count as absent.
    #[must_use]
    pub fn from_customer(customer: &Customer) -> Self {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };

        Self {
            email: present(&customer.email),
            phone: present(&customer.phone),
            country_code: customer.country_code(),
        }
    }

    /// True when no field would be sent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.country_code.is_none()
    }
}

/// Checkout fields returned by `checkoutBuyerIdentityUpdate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    /// Checkout GID.
    pub id: String,
    /// Hosted checkout URL.
    pub web_url: String,
    /// Whether Shopify finished computing taxes and totals.
    pub ready: bool,
    /// Total price including taxes.
    pub total_price: Money,
}

/// Error returned by checkout mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutUserError {
    /// Path to the input field that caused the error.
    pub field: Option<Vec<String>>,
    /// Error message.
    pub message: String,
    /// Error code.
    pub code: Option<String>,
}

/// Payload of `checkoutBuyerIdentityUpdate`.
///
/// User errors are data, not failures: callers decide whether to log them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBuyerIdentityUpdate {
    /// Updated checkout, absent when the update was rejected.
    pub checkout: Option<Checkout>,
    /// Validation errors.
    #[serde(default)]
    pub checkout_user_errors: Vec<CheckoutUserError>,
}

impl CheckoutBuyerIdentityUpdate {
    /// Join user error messages for logging.
    #[must_use]
    pub fn user_error_summary(&self) -> Option<String> {
        if self.checkout_user_errors.is_empty() {
            return None;
        }
        Some(
            self.checkout_user_errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
