use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::{BuyerIdentityUpdater, CustomerResolver, extract_checkout_id, transform_checkout_url};
use crate::shopify::{BuyerIdentity, Customer, ShopifyError};

/// Storefront login page that checkout sends guests to.
const LOGIN_PATH: &str = "/account/login";

/// Caller options for [`CheckoutService::prepare`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutOptions {
    /// Require a signed-in customer; guests get [`CheckoutError::AuthRequired`].
    pub redirect_to_login: bool,
    /// Where login should return to. Defaults to the checkout URL.
    pub return_url: Option<String>,
    /// Order note. Accepted for API compatibility; not sent to Shopify.
    pub note: Option<String>,
    /// Discount codes. Accepted for API compatibility; not sent to Shopify.
    pub discount_codes: Vec<String>,
}

/// What happened to the buyer identity on the way to checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enhancement {
    /// Buyer identity attached; the URL came back from the mutation.
    Applied,
    /// Nothing to attach (guest, empty URL, or no checkout id in the URL).
    Skipped(String),
    /// The mutation failed or returned user errors; the original URL is used.
    Degraded(String),
}

/// A checkout URL ready to hand to the browser.
#[derive(Debug, Clone)]
pub struct PreparedCheckout {
    /// Checkout URL on the custom domain (when configured).
    pub checkout_url: String,
    /// Customer the checkout was prepared for.
    pub customer: Option<Customer>,
    pub enhancement: Enhancement,
}

/// Fatal checkout preparation failures.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Login is required before checkout.
    #[error("Authentication required")]
    AuthRequired {
        /// Login path carrying the return URL.
        login_url: String,
    },

    /// The customer lookup itself failed.
    #[error("Failed to resolve customer: {0}")]
    CustomerResolution(#[from] ShopifyError),
}

/// Login path that returns to `return_url` afterwards.
#[must_use]
pub fn login_path(return_url: &str) -> String {
    format!("{LOGIN_PATH}?returnUrl={}", urlencoding::encode(return_url))
}

// =============================================================================
// CheckoutService
// =============================================================================

/// Prepares hosted checkout URLs for the current visitor.
#[derive(Clone)]
pub struct CheckoutService {
    customers: Arc<dyn CustomerResolver>,
    identities: Arc<dyn BuyerIdentityUpdater>,
    custom_domain: Option<String>,
}

impl CheckoutService {
    /// Create a checkout service over the given Shopify ports.
    #[must_use]
    pub fn new(
        customers: Arc<dyn CustomerResolver>,
        identities: Arc<dyn BuyerIdentityUpdater>,
        custom_domain: Option<String>,
    ) -> Self {
        Self {
            customers,
            identities,
            custom_domain,
        }
    }

    /// Transform a checkout URL onto the configured custom domain.
    #[must_use]
    pub fn transform_url(&self, checkout_url: &str) -> String {
        transform_checkout_url(checkout_url, self.custom_domain.as_deref())
    }

    /// Prepare a checkout URL for the visitor holding `access_token`.
    ///
    /// Buyer identity enhancement never fails the call: mutation errors are
    /// logged and reported as [`Enhancement::Degraded`].
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::AuthRequired`] when `redirect_to_login` is set
    /// and there is no customer, or [`CheckoutError::CustomerResolution`] when
    /// the customer lookup fails.
    #[instrument(skip(self, access_token, options), fields(has_token = access_token.is_some()))]
    pub async fn prepare(
        &self,
        checkout_url: &str,
        access_token: Option<&str>,
        options: &CheckoutOptions,
    ) -> Result<PreparedCheckout, CheckoutError> {
        let customer = self.customers.current_customer(access_token).await?;

        let Some(customer) = customer else {
            if options.redirect_to_login {
                let return_url = options.return_url.as_deref().unwrap_or(checkout_url);
                return Err(CheckoutError::AuthRequired {
                    login_url: login_path(return_url),
                });
            }
            return Ok(PreparedCheckout {
                checkout_url: self.transform_url(checkout_url),
                customer: None,
                enhancement: Enhancement::Skipped("guest checkout".to_string()),
            });
        };

        let (url, enhancement) = self.enhance(checkout_url, &customer).await;

        Ok(PreparedCheckout {
            checkout_url: self.transform_url(&url),
            customer: Some(customer),
            enhancement,
        })
    }

    /// Attach the customer's buyer identity, returning the URL to use.
    async fn enhance(&self, checkout_url: &str, customer: &Customer) -> (String, Enhancement) {
        let skipped = |reason: &str| (checkout_url.to_string(), Enhancement::Skipped(reason.to_string()));

        if checkout_url.trim().is_empty() {
            return skipped("empty checkout url");
        }

        let Some(checkout_id) = extract_checkout_id(checkout_url) else {
            debug!(checkout_url, "No checkout id in URL, skipping buyer identity");
            return skipped("no checkout id in url");
        };

        let identity = BuyerIdentity::from_customer(customer);
        if identity.is_empty() {
            return skipped("customer has no buyer identity fields");
        }

        let degraded = |reason: String| {
            warn!(checkout_id = %checkout_id, reason = %reason, "Buyer identity update degraded");
            (checkout_url.to_string(), Enhancement::Degraded(reason))
        };

        match self.identities.update_buyer_identity(&checkout_id, &identity).await {
            Ok(payload) => {
                if let Some(summary) = payload.user_error_summary() {
                    return degraded(format!("checkout user errors: {summary}"));
                }
                match payload.checkout {
                    Some(checkout) => {
                        info!(checkout_id = %checkout_id, ready = checkout.ready, "Buyer identity attached");
                        (checkout.web_url, Enhancement::Applied)
                    }
                    None => degraded("mutation returned no checkout".to_string()),
                }
            }
            Err(e) => degraded(e.to_string()),
        }
    }
}

// =============================================================================
// Wire format
// =============================================================================

/// JSON shape returned to the browser by checkout preparation.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
}

impl From<Result<PreparedCheckout, CheckoutError>> for CheckoutResult {
    fn from(result: Result<PreparedCheckout, CheckoutError>) -> Self {
        match result {
            Ok(prepared) => Self {
                success: true,
                checkout_url: Some(prepared.checkout_url),
                customer: prepared.customer,
                ..Self::default()
            },
            Err(CheckoutError::AuthRequired { .. }) => Self {
                success: false,
                error: Some("Authentication required".to_string()),
                requires_auth: Some(true),
                ..Self::default()
            },
            Err(CheckoutError::CustomerResolution(_)) => Self {
                success: false,
                error: Some("Unable to prepare checkout".to_string()),
                ..Self::default()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use shopfront_core::ShopifyGid;

    use super::*;
    use crate::shopify::{Checkout, CheckoutBuyerIdentityUpdate, CheckoutUserError, GraphQLError, Money};

    const URL: &str = "https://shop.myshopify.com/1234/checkouts/abc123?key=k";
    const DOMAIN: &str = "checkout.example.com";

    /// Resolver returning a fixed customer, or failing.
    pub struct FakeResolver {
        pub customer: Option<Customer>,
        pub fail: bool,
    }

    #[async_trait]
    impl CustomerResolver for FakeResolver {
        async fn current_customer(
            &self,
            access_token: Option<&str>,
        ) -> Result<Option<Customer>, ShopifyError> {
            if self.fail {
                return Err(ShopifyError::GraphQL(vec![GraphQLError::message("boom")]));
            }
            Ok(access_token.and(self.customer.clone()))
        }
    }

    /// How the fake mutation responds.
    pub enum UpdateOutcome {
        Applied(String),
        UserErrors,
        Fails,
    }

    /// Updater recording the identities it was sent.
    pub struct FakeUpdater {
        pub outcome: UpdateOutcome,
        pub calls: Mutex<Vec<(ShopifyGid, BuyerIdentity)>>,
    }

    impl FakeUpdater {
        pub fn new(outcome: UpdateOutcome) -> Self {
            Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl BuyerIdentityUpdater for FakeUpdater {
        async fn update_buyer_identity(
            &self,
            checkout_id: &ShopifyGid,
            buyer_identity: &BuyerIdentity,
        ) -> Result<CheckoutBuyerIdentityUpdate, ShopifyError> {
            self.calls
                .lock()
                .unwrap()
                .push((checkout_id.clone(), buyer_identity.clone()));
            match &self.outcome {
                UpdateOutcome::Applied(web_url) => Ok(CheckoutBuyerIdentityUpdate {
                    checkout: Some(Checkout {
                        id: checkout_id.to_string(),
                        web_url: web_url.clone(),
                        ready: true,
                        total_price: Money {
                            amount: "10.0".to_string(),
                            currency_code: "USD".to_string(),
                        },
                    }),
                    checkout_user_errors: Vec::new(),
                }),
                UpdateOutcome::UserErrors => Ok(CheckoutBuyerIdentityUpdate {
                    checkout: None,
                    checkout_user_errors: vec![CheckoutUserError {
                        field: None,
                        message: "Checkout is already completed".to_string(),
                        code: Some("ALREADY_COMPLETED".to_string()),
                    }],
                }),
                UpdateOutcome::Fails => Err(ShopifyError::RateLimited(2)),
            }
        }
    }

    pub fn customer() -> Customer {
        Customer {
            id: "gid://shopify/Customer/1".to_string(),
            email: Some("buyer@example.com".to_string()),
            phone: None,
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            default_address: None,
        }
    }

    fn service(
        customer: Option<Customer>,
        updater: Arc<FakeUpdater>,
        domain: Option<&str>,
    ) -> CheckoutService {
        CheckoutService::new(
            Arc::new(FakeResolver {
                customer,
                fail: false,
            }),
            updater,
            domain.map(str::to_string),
        )
    }

    fn login_options() -> CheckoutOptions {
        CheckoutOptions {
            redirect_to_login: true,
            ..CheckoutOptions::default()
        }
    }

    #[tokio::test]
    async fn test_guest_with_login_required() {
        let updater = Arc::new(FakeUpdater::new(UpdateOutcome::Fails));
        let svc = service(None, updater.clone(), Some(DOMAIN));

        for url in [URL, "", "not a url"] {
            let result = svc.prepare(url, None, &login_options()).await;
            match &result {
                Err(CheckoutError::AuthRequired { login_url }) => {
                    assert!(login_url.starts_with("/account/login?returnUrl="));
                }
                other => panic!("expected auth required, got {other:?}"),
            }
            let wire = CheckoutResult::from(result);
            assert!(!wire.success);
            assert_eq!(wire.requires_auth, Some(true));
        }
        assert!(updater.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_path_prefers_return_url() {
        let svc = service(None, Arc::new(FakeUpdater::new(UpdateOutcome::Fails)), None);
        let options = CheckoutOptions {
            redirect_to_login: true,
            return_url: Some("/cart?step=2".to_string()),
            ..CheckoutOptions::default()
        };
        let err = svc.prepare(URL, None, &options).await.unwrap_err();
        match err {
            CheckoutError::AuthRequired { login_url } => {
                assert_eq!(login_url, "/account/login?returnUrl=%2Fcart%3Fstep%3D2");
            }
            CheckoutError::CustomerResolution(_) => panic!("expected auth required"),
        }
    }

    #[tokio::test]
    async fn test_guest_without_login_gets_transformed_url() {
        let updater = Arc::new(FakeUpdater::new(UpdateOutcome::Fails));
        let svc = service(None, updater.clone(), Some(DOMAIN));

        let prepared = svc.prepare(URL, None, &CheckoutOptions::default()).await.unwrap();
        assert_eq!(
            prepared.checkout_url,
            "https://checkout.example.com/1234/checkouts/abc123?key=k"
        );
        assert!(matches!(prepared.enhancement, Enhancement::Skipped(_)));
        assert!(updater.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_customer_identity_applied() {
        let web_url = "https://shop.myshopify.com/1234/checkouts/abc123?key=new";
        let updater = Arc::new(FakeUpdater::new(UpdateOutcome::Applied(web_url.to_string())));
        let svc = service(Some(customer()), updater.clone(), Some(DOMAIN));

        let prepared = svc
            .prepare(URL, Some("token"), &CheckoutOptions::default())
            .await
            .unwrap();
        assert_eq!(prepared.enhancement, Enhancement::Applied);
        assert_eq!(
            prepared.checkout_url,
            "https://checkout.example.com/1234/checkouts/abc123?key=new"
        );

        let calls = updater.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (id, identity) = calls.first().unwrap();
        assert_eq!(id.to_string(), "gid://shopify/Checkout/abc123");
        assert_eq!(identity.email.as_deref(), Some("buyer@example.com"));
        assert!(identity.phone.is_none());
    }

    #[tokio::test]
    async fn test_mutation_failure_degrades() {
        let updater = Arc::new(FakeUpdater::new(UpdateOutcome::Fails));
        let svc = service(Some(customer()), updater, Some(DOMAIN));

        let result = svc.prepare(URL, Some("token"), &login_options()).await;
        let prepared = result.as_ref().unwrap();
        assert!(matches!(prepared.enhancement, Enhancement::Degraded(_)));
        assert_eq!(
            prepared.checkout_url,
            transform_checkout_url(URL, Some(DOMAIN))
        );

        let wire = CheckoutResult::from(result);
        assert!(wire.success);
        assert!(wire.customer.is_some());
        assert!(wire.requires_auth.is_none());
    }

    #[tokio::test]
    async fn test_user_errors_degrade() {
        let updater = Arc::new(FakeUpdater::new(UpdateOutcome::UserErrors));
        let svc = service(Some(customer()), updater, None);

        let prepared = svc
            .prepare(URL, Some("token"), &CheckoutOptions::default())
            .await
            .unwrap();
        assert_eq!(prepared.checkout_url, URL);
        match prepared.enhancement {
            Enhancement::Degraded(reason) => assert!(reason.contains("already completed")),
            other => panic!("expected degraded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_url_without_checkout_id_skips_mutation() {
        let updater = Arc::new(FakeUpdater::new(UpdateOutcome::Fails));
        let svc = service(Some(customer()), updater.clone(), Some(DOMAIN));

        let prepared = svc
            .prepare("https://shop.myshopify.com/cart", Some("token"), &CheckoutOptions::default())
            .await
            .unwrap();
        assert!(matches!(prepared.enhancement, Enhancement::Skipped(_)));
        assert_eq!(prepared.checkout_url, "https://checkout.example.com/cart");
        assert!(updater.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolution_failure_is_fatal() {
        let svc = CheckoutService::new(
            Arc::new(FakeResolver {
                customer: None,
                fail: true,
            }),
            Arc::new(FakeUpdater::new(UpdateOutcome::Fails)),
            None,
        );

        let result = svc.prepare(URL, Some("token"), &CheckoutOptions::default()).await;
        assert!(matches!(result, Err(CheckoutError::CustomerResolution(_))));

        let wire = CheckoutResult::from(result);
        assert!(!wire.success);
        assert!(wire.requires_auth.is_none());
        assert!(wire.error.is_some());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let wire = CheckoutResult {
            success: true,
            checkout_url: Some(URL.to_string()),
            ..CheckoutResult::default()
        };
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "checkoutUrl": URL }));
    }

    #[test]
    fn test_options_deserialize_defaults() {
        let options: CheckoutOptions =
            serde_json::from_str(r#"{"redirectToLogin":true,"discountCodes":["SAVE10"]}"#).unwrap();
        assert!(options.redirect_to_login);
        assert_eq!(options.discount_codes, vec!["SAVE10".to_string()]);
        assert!(options.return_url.is_none());
    }
}
