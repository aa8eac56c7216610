//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_STOREFRONT_TOKEN` - Storefront API access token
//! - `SUPABASE_URL` - Supabase project URL
//! - `SUPABASE_ANON_KEY` - Supabase anon (public) API key
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - API version (default: 2024-04)
//! - `SHOPIFY_TIMEOUT_SECS` - Storefront API request timeout (default: 10)
//! - `CHECKOUT_CUSTOM_DOMAIN` - Custom domain for hosted checkout (absent: keep Shopify's host)
//! - `SUPABASE_TIMEOUT_SECS` - Supabase auth request timeout (default: 10)
//! - `SHOP_BASE_CURRENCY` - Currency the shop prices in (default: USD)
//! - `MARKET_EXCHANGE_RATES` - Rates relative to the base currency, e.g. `CAD=1.36,EUR=0.92`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use shopfront_core::{CurrencyCode, ExchangeRates};
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Shopify Storefront API configuration
    pub shopify: ShopifyStorefrontConfig,
    /// Hosted checkout configuration
    pub checkout: CheckoutConfig,
    /// Supabase auth configuration
    pub supabase: SupabaseConfig,
    /// Currency conversion for market price display
    pub markets: MarketConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2024-04)
    pub api_version: String,
    /// Storefront API access token
    pub storefront_token: SecretString,
    /// Per-request timeout for Storefront API calls
    pub timeout: Duration,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("storefront_token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Hosted checkout configuration.
#[derive(Debug, Clone, Default)]
pub struct CheckoutConfig {
    /// Domain that replaces `*.myshopify.com` in checkout URLs.
    ///
    /// `None` leaves checkout URLs on Shopify's host.
    pub custom_domain: Option<String>,
}

/// Supabase auth configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL (e.g., <https://abc.supabase.co>)
    pub url: String,
    /// Anon API key sent as the `apikey` header
    pub anon_key: SecretString,
    /// Per-request timeout for token verification
    pub timeout: Duration,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Market price conversion configuration.
#[derive(Debug, Clone, Default)]
pub struct MarketConfig {
    /// Exchange rates relative to the shop's base currency.
    pub exchange_rates: ExchangeRates,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            shopify: ShopifyStorefrontConfig::from_env()?,
            checkout: CheckoutConfig::from_env(),
            supabase: SupabaseConfig::from_env()?,
            markets: MarketConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyStorefrontConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            store: get_required_env("SHOPIFY_STORE")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2024-04"),
            storefront_token: get_validated_secret("SHOPIFY_STOREFRONT_TOKEN")?,
            timeout: get_timeout("SHOPIFY_TIMEOUT_SECS")?,
        })
    }
}

impl CheckoutConfig {
    fn from_env() -> Self {
        Self {
            custom_domain: get_optional_env("CHECKOUT_CUSTOM_DOMAIN")
                .filter(|domain| !domain.trim().is_empty()),
        }
    }
}

impl SupabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: get_required_env("SUPABASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            anon_key: get_validated_secret("SUPABASE_ANON_KEY")?,
            timeout: get_timeout("SUPABASE_TIMEOUT_SECS")?,
        })
    }
}

impl MarketConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base = get_env_or_default("SHOP_BASE_CURRENCY", "USD")
            .parse::<CurrencyCode>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHOP_BASE_CURRENCY".to_string(), e.to_string())
            })?;
        let rates = get_optional_env("MARKET_EXCHANGE_RATES").unwrap_or_default();
        let exchange_rates = ExchangeRates::parse(base, &rates).map_err(|e| {
            ConfigError::InvalidEnvVar("MARKET_EXCHANGE_RATES".to_string(), e.to_string())
        })?;
        Ok(Self { exchange_rates })
    }
}

#[cfg(test)]
impl StorefrontConfig {
    /// Offline configuration for unit and route tests.
    pub(crate) fn for_tests() -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/shopfront_test"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            shopify: ShopifyStorefrontConfig {
                store: "test.myshopify.com".to_string(),
                api_version: "2024-04".to_string(),
                storefront_token: SecretString::from("super_secret_storefront_token"),
                timeout: Duration::from_secs(10),
            },
            checkout: CheckoutConfig {
                custom_domain: Some("checkout.example.com".to_string()),
            },
            supabase: SupabaseConfig {
                url: "https://abc.supabase.co".to_string(),
                anon_key: SecretString::from("super_secret_anon_key"),
                timeout: Duration::from_secs(5),
            },
            markets: MarketConfig {
                exchange_rates: ExchangeRates::parse(CurrencyCode::USD, "CAD=1.35,EUR=0.92")
                    .unwrap_or_default(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a request timeout in whole seconds (must be non-zero).
fn get_timeout(key: &str) -> Result<Duration, ConfigError> {
    let raw = get_env_or_default(key, &DEFAULT_TIMEOUT_SECS.to_string());
    parse_timeout(key, &raw)
}

fn parse_timeout(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "timeout must be greater than zero".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
