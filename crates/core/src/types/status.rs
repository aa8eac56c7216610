//! Status enums shared between the checkout flow and the review API.

use serde::{Deserialize, Serialize};

/// Outcome of a visit to Shopify's hosted checkout, as reported by the
/// query string on the redirect back to the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    /// Order placed.
    #[default]
    Success,
    /// Buyer backed out of checkout.
    Cancelled,
    /// Payment or checkout failed.
    Failed,
    /// Payment is still being processed.
    Processing,
}

impl CheckoutStatus {
    /// Storefront path the buyer should be sent to next, if any.
    ///
    /// `Processing` has no follow-up page; the caller decides what to render.
    #[must_use]
    pub const fn follow_up_path(self) -> Option<&'static str> {
        match self {
            Self::Success => Some("/order-confirmation"),
            Self::Cancelled => Some("/cart?cancelled=true"),
            Self::Failed => Some("/cart?error=checkout_failed"),
            Self::Processing => None,
        }
    }
}

impl std::fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Failed => write!(f, "failed"),
            Self::Processing => write!(f, "processing"),
        }
    }
}

/// Where a product was shared from the storefront's share buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharePlatform {
    Facebook,
    Twitter,
    Pinterest,
    Whatsapp,
    Email,
    CopyLink,
}

impl SharePlatform {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Pinterest => "pinterest",
            Self::Whatsapp => "whatsapp",
            Self::Email => "email",
            Self::CopyLink => "copy_link",
        }
    }
}

impl std::fmt::Display for SharePlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SharePlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "facebook" => Ok(Self::Facebook),
            "twitter" => Ok(Self::Twitter),
            "pinterest" => Ok(Self::Pinterest),
            "whatsapp" => Ok(Self::Whatsapp),
            "email" => Ok(Self::Email),
            "copy_link" => Ok(Self::CopyLink),
            _ => Err(format!("invalid share platform: {s}")),
        }
    }
}
