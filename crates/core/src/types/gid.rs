//! Shopify global object IDs (`gid://shopify/<Resource>/<id>`).

use core::fmt;

use serde::{Deserialize, Serialize};

const GID_PREFIX: &str = "gid://shopify/";

/// Errors that can occur when parsing a [`ShopifyGid`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GidError {
    /// The value does not start with `gid://shopify/`.
    #[error("global id must start with {GID_PREFIX}")]
    MissingPrefix,
    /// The resource type segment is missing or empty.
    #[error("global id is missing a resource type")]
    MissingResource,
    /// The id segment is missing or empty.
    #[error("global id is missing an id")]
    MissingId,
    /// The id is not in the form the resource type uses.
    #[error("invalid {resource} id: {id}")]
    InvalidId {
        /// Resource type of the value.
        resource: String,
        /// The rejected id.
        id: String,
    },
    /// The resource type differs from the one required by the caller.
    #[error("expected a {expected} id, got {actual}")]
    WrongResource {
        /// Resource type the caller asked for.
        expected: String,
        /// Resource type found in the value.
        actual: String,
    },
}

/// A Shopify global object ID.
///
/// The opaque `id` part may itself contain query parameters (checkout ids
/// carry `?key=...`), so everything after the resource segment is kept
/// verbatim.
///
/// ```
/// use shopfront_core::ShopifyGid;
///
/// let gid = ShopifyGid::new("Checkout", "abc123");
/// assert_eq!(gid.to_string(), "gid://shopify/Checkout/abc123");
///
/// let parsed: ShopifyGid = "gid://shopify/Product/42".parse().unwrap();
/// assert_eq!(parsed.resource(), "Product");
/// assert_eq!(parsed.id(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShopifyGid {
    resource: String,
    id: String,
}

impl ShopifyGid {
    /// Resource type for hosted checkouts.
    pub const CHECKOUT: &'static str = "Checkout";
    /// Resource type for products.
    pub const PRODUCT: &'static str = "Product";

    /// Build a GID from a resource type and opaque id.
    #[must_use]
    pub fn new(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Build a checkout GID.
    #[must_use]
    pub fn checkout(id: impl Into<String>) -> Self {
        Self::new(Self::CHECKOUT, id)
    }

    /// Parse a GID string.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix, resource type, or id is missing.
    pub fn parse(s: &str) -> Result<Self, GidError> {
        let rest = s.strip_prefix(GID_PREFIX).ok_or(GidError::MissingPrefix)?;
        let (resource, id) = rest.split_once('/').ok_or(GidError::MissingId)?;
        if resource.is_empty() {
            return Err(GidError::MissingResource);
        }
        if id.is_empty() {
            return Err(GidError::MissingId);
        }
        Ok(Self::new(resource, id))
    }

    /// Parse a GID and require a specific resource type.
    ///
    /// # Errors
    ///
    /// Returns [`GidError::WrongResource`] if the type does not match,
    /// [`GidError::InvalidId`] for a product id that is not numeric, or any
    /// error from [`ShopifyGid::parse`].
    pub fn parse_resource(s: &str, expected: &str) -> Result<Self, GidError> {
        let gid = Self::parse(s)?;
        if gid.resource != expected {
            return Err(GidError::WrongResource {
                expected: expected.to_owned(),
                actual: gid.resource,
            });
        }
        // Product ids are numeric.
        if expected == Self::PRODUCT && !gid.id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GidError::InvalidId {
                resource: gid.resource,
                id: gid.id,
            });
        }
        Ok(gid)
    }

    /// The resource type (e.g. `Checkout`).
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The opaque id part.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ShopifyGid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{GID_PREFIX}{}/{}", self.resource, self.id)
    }
}

impl std::str::FromStr for ShopifyGid {
    type Err = GidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShopifyGid {
    type Error = GidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShopifyGid> for String {
    fn from(gid: ShopifyGid) -> Self {
        gid.to_string()
    }
}
