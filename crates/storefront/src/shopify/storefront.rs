//! Shopify Storefront API client implementation.
//!
//! Posts hand-written GraphQL documents with `reqwest` and decodes the
//! `data` payload into the serde types in [`super::types`].

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::checkout::{BuyerIdentityUpdater, CustomerResolver};
use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{
    BuyerIdentity, CheckoutBuyerIdentityUpdate, Customer, CustomerAccessToken, CustomerUserError,
};
use crate::shopify::{GraphQLError, ShopifyError};
use shopfront_core::ShopifyGid;

/// Maximum characters of an error body kept in logs and errors.
const ERROR_BODY_PREVIEW: usize = 500;

const CUSTOMER_QUERY: &str = r"
    query getCustomer($customerAccessToken: String!) {
        customer(customerAccessToken: $customerAccessToken) {
            id
            email
            phone
            firstName
            lastName
            defaultAddress {
                id
                city
                provinceCode
                countryCodeV2
                zip
            }
        }
    }
";

const BUYER_IDENTITY_MUTATION: &str = r"
    mutation checkoutBuyerIdentityUpdate($checkoutId: ID!, $buyerIdentity: CheckoutBuyerIdentityInput!) {
        checkoutBuyerIdentityUpdate(checkoutId: $checkoutId, buyerIdentity: $buyerIdentity) {
            checkout {
                id
                webUrl
                ready
                totalPrice {
                    amount
                    currencyCode
                }
            }
            checkoutUserErrors {
                field
                message
                code
            }
        }
    }
";

const TOKEN_CREATE_MUTATION: &str = r"
    mutation customerAccessTokenCreate($input: CustomerAccessTokenCreateInput!) {
        customerAccessTokenCreate(input: $input) {
            customerAccessToken {
                accessToken
                expiresAt
            }
            customerUserErrors {
                field
                message
                code
            }
        }
    }
";

const TOKEN_DELETE_MUTATION: &str = r"
    mutation customerAccessTokenDelete($customerAccessToken: String!) {
        customerAccessTokenDelete(customerAccessToken: $customerAccessToken) {
            deletedAccessToken
            userErrors {
                field
                message
            }
        }
    }
";

// ─────────────────────────────────────────────────────────────────────────────
// GraphQL envelope
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

impl<T> GraphQLResponse<T> {
    fn into_result(self) -> Result<T, ShopifyError> {
        if let Some(errors) = self.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(errors));
        }

        self.data
            .ok_or_else(|| ShopifyError::GraphQL(vec![GraphQLError::message("No data in response")]))
    }
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW).collect()
}

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ShopifyStorefrontConfig) -> Result<Self, ShopifyError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("shopfront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let endpoint = format!(
            "https://{}/api/{}/graphql.json",
            config.store, config.api_version
        );

        Ok(Self {
            inner: Arc::new(StorefrontClientInner {
                client,
                endpoint,
                access_token: config.storefront_token.expose_secret().to_string(),
            }),
        })
    }

    /// The GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Execute a GraphQL document and decode its `data` payload.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("X-Shopify-Storefront-Access-Token", &self.inner.access_token)
            .header("Content-Type", "application/json")
            .json(&GraphQLRequest { query, variables })
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Read as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %preview(&response_text),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::GraphQL(vec![GraphQLError::message(format!(
                "HTTP {status}: {}",
                response_text.chars().take(200).collect::<String>()
            ))]));
        }

        let parsed: GraphQLResponse<T> = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %preview(&response_text),
                "Failed to parse Shopify GraphQL response"
            );
            ShopifyError::Parse(e)
        })?;

        parsed.into_result()
    }

    // =========================================================================
    // Customer Methods
    // =========================================================================

    /// Look up the customer owning an access token.
    ///
    /// Returns `Ok(None)` when Shopify does not recognize the token (expired
    /// or revoked).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, access_token))]
    pub async fn get_customer(&self, access_token: &str) -> Result<Option<Customer>, ShopifyError> {
        #[derive(Deserialize)]
        struct Response {
            customer: Option<Customer>,
        }

        let data: Response = self
            .execute(
                CUSTOMER_QUERY,
                serde_json::json!({ "customerAccessToken": access_token }),
            )
            .await?;

        Ok(data.customer)
    }

    /// Exchange email and password for a customer access token.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserError` for rejected credentials, or an
    /// error if the API request fails.
    #[instrument(skip(self, password))]
    pub async fn create_customer_access_token(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CustomerAccessToken, ShopifyError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            customer_access_token_create: Payload,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Payload {
            customer_access_token: Option<CustomerAccessToken>,
            #[serde(default)]
            customer_user_errors: Vec<CustomerUserError>,
        }

        let data: Response = self
            .execute(
                TOKEN_CREATE_MUTATION,
                serde_json::json!({ "input": { "email": email, "password": password } }),
            )
            .await?;

        let payload = data.customer_access_token_create;
        if !payload.customer_user_errors.is_empty() {
            let messages: Vec<_> = payload
                .customer_user_errors
                .iter()
                .map(|e| e.message.as_str())
                .collect();
            return Err(ShopifyError::UserError(messages.join("; ")));
        }

        payload
            .customer_access_token
            .ok_or_else(|| ShopifyError::UserError("Unidentified customer".to_string()))
    }

    /// Revoke a customer access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or Shopify reports user errors.
    #[instrument(skip(self, access_token))]
    pub async fn delete_customer_access_token(&self, access_token: &str) -> Result<(), ShopifyError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            customer_access_token_delete: Option<Payload>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Payload {
            #[serde(default)]
            user_errors: Vec<CustomerUserError>,
        }

        let data: Response = self
            .execute(
                TOKEN_DELETE_MUTATION,
                serde_json::json!({ "customerAccessToken": access_token }),
            )
            .await?;

        if let Some(payload) = data.customer_access_token_delete
            && !payload.user_errors.is_empty()
        {
            let messages: Vec<_> = payload.user_errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ShopifyError::UserError(messages.join("; ")));
        }

        Ok(())
    }

    // =========================================================================
    // Checkout Methods
    // =========================================================================

    /// Attach a buyer identity to an in-progress checkout.
    ///
    /// User errors are returned in the payload, not as `Err`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response carries
    /// top-level GraphQL errors.
    #[instrument(skip(self, buyer_identity), fields(checkout_id = %checkout_id))]
    pub async fn checkout_buyer_identity_update(
        &self,
        checkout_id: &ShopifyGid,
        buyer_identity: &BuyerIdentity,
    ) -> Result<CheckoutBuyerIdentityUpdate, ShopifyError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            checkout_buyer_identity_update: Option<CheckoutBuyerIdentityUpdate>,
        }

        let data: Response = self
            .execute(
                BUYER_IDENTITY_MUTATION,
                serde_json::json!({
                    "checkoutId": checkout_id.to_string(),
                    "buyerIdentity": buyer_identity,
                }),
            )
            .await?;

        data.checkout_buyer_identity_update.ok_or_else(|| {
            ShopifyError::NotFound(format!("checkout {checkout_id} returned no payload"))
        })
    }
}

#[async_trait]
impl CustomerResolver for StorefrontClient {
    async fn current_customer(
        &self,
        access_token: Option<&str>,
    ) -> Result<Option<Customer>, ShopifyError> {
        match access_token {
            Some(token) if !token.is_empty() => self.get_customer(token).await,
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl BuyerIdentityUpdater for StorefrontClient {
    async fn update_buyer_identity(
        &self,
        checkout_id: &ShopifyGid,
        buyer_identity: &BuyerIdentity,
    ) -> Result<CheckoutBuyerIdentityUpdate, ShopifyError> {
        self.checkout_buyer_identity_update(checkout_id, buyer_identity)
            .await
    }
}
