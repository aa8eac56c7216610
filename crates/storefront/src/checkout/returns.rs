use std::collections::HashMap;

use serde::Serialize;
use shopfront_core::CheckoutStatus;

/// Query parameters that mark a request as a redirect back from checkout.
const RETURN_INDICATORS: [&str; 8] = [
    "order_id",
    "order_number",
    "checkout_id",
    "_s",
    "thank_you",
    "cancelled",
    "failed",
    "processing",
];

/// Outcome of a redirect back from hosted checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReturnInfo {
    /// Whether the request carried any checkout return parameter.
    pub is_return: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CheckoutStatus>,
    /// Where to send the shopper next.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

/// Classify a redirect back from hosted checkout by its query parameters.
///
/// Status precedence is cancelled, then failed, then processing; any other
/// return is a success. Requests with no return parameter produce the
/// default (non-return) value.
#[must_use]
pub fn classify_return(params: &HashMap<String, String>) -> CheckoutReturnInfo {
    if !RETURN_INDICATORS.iter().any(|key| params.contains_key(*key)) {
        return CheckoutReturnInfo::default();
    }

    let value = |key: &str| {
        params
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    };
    let flag = |key: &str| {
        params
            .get(key)
            .is_some_and(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0"))
    };

    let status = if flag("cancelled") {
        CheckoutStatus::Cancelled
    } else if flag("failed") {
        CheckoutStatus::Failed
    } else if flag("processing") {
        CheckoutStatus::Processing
    } else {
        CheckoutStatus::Success
    };

    let order_id = value("order_id");
    let order_number = value("order_number");
    let redirect_to = redirect_for(status, order_id.as_deref(), order_number.as_deref());

    CheckoutReturnInfo {
        is_return: true,
        order_id,
        order_number,
        checkout_id: value("checkout_id"),
        customer_email: value("email"),
        status: Some(status),
        redirect_to,
    }
}

fn redirect_for(
    status: CheckoutStatus,
    order_id: Option<&str>,
    order_number: Option<&str>,
) -> Option<String> {
    let path = status.follow_up_path()?;
    if status != CheckoutStatus::Success {
        return Some(path.to_string());
    }

    let query = match (order_id, order_number) {
        (Some(id), _) => format!("?order_id={}", urlencoding::encode(id)),
        (None, Some(number)) => format!("?order_number={}", urlencoding::encode(number)),
        (None, None) => String::new(),
    };
    Some(format!("{path}{query}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_cancelled_return() {
        let info = classify_return(&params(&[("cancelled", "true"), ("checkout_id", "123")]));
        assert!(info.is_return);
        assert_eq!(info.status, Some(CheckoutStatus::Cancelled));
        assert_eq!(info.redirect_to.as_deref(), Some("/cart?cancelled=true"));
        assert_eq!(info.checkout_id.as_deref(), Some("123"));
    }

    #[test]
    fn test_thank_you_success() {
        let info = classify_return(&params(&[("thank_you", "1"), ("order_id", "456")]));
        assert!(info.is_return);
        assert_eq!(info.status, Some(CheckoutStatus::Success));
        let redirect = info.redirect_to.unwrap();
        assert!(redirect.starts_with("/order-confirmation"));
        assert_eq!(redirect, "/order-confirmation?order_id=456");
    }

    #[test]
    fn test_empty_query_is_not_a_return() {
        let info = classify_return(&HashMap::new());
        assert_eq!(info, CheckoutReturnInfo::default());
        assert!(!info.is_return);
        assert!(info.status.is_none());
        assert!(info.redirect_to.is_none());
    }

    #[test]
    fn test_unrecognized_params_ignored() {
        let info = classify_return(&params(&[("utm_source", "mail"), ("email", "a@b.co")]));
        assert_eq!(info, CheckoutReturnInfo::default());
    }

    #[test]
    fn test_status_precedence() {
        let info = classify_return(&params(&[("failed", "1"), ("cancelled", "1")]));
        assert_eq!(info.status, Some(CheckoutStatus::Cancelled));

        let info = classify_return(&params(&[("failed", "true"), ("processing", "true")]));
        assert_eq!(info.status, Some(CheckoutStatus::Failed));
        assert_eq!(info.redirect_to.as_deref(), Some("/cart?error=checkout_failed"));

        let info = classify_return(&params(&[("processing", "yes"), ("_s", "x")]));
        assert_eq!(info.status, Some(CheckoutStatus::Processing));
        assert!(info.redirect_to.is_none());
    }

    #[test]
    fn test_false_flags_do_not_set_status() {
        let info = classify_return(&params(&[("cancelled", "false"), ("order_number", "1001")]));
        assert_eq!(info.status, Some(CheckoutStatus::Success));
        assert_eq!(
            info.redirect_to.as_deref(),
            Some("/order-confirmation?order_number=1001")
        );

        let info = classify_return(&params(&[("failed", "0")]));
        assert!(info.is_return);
        assert_eq!(info.status, Some(CheckoutStatus::Success));
        assert_eq!(info.redirect_to.as_deref(), Some("/order-confirmation"));
    }

    #[test]
    fn test_order_id_is_encoded_and_email_kept() {
        let info = classify_return(&params(&[
            ("order_id", "gid://shopify/Order/9"),
            ("email", "buyer@example.com"),
        ]));
        assert_eq!(
            info.redirect_to.as_deref(),
            Some("/order-confirmation?order_id=gid%3A%2F%2Fshopify%2FOrder%2F9")
        );
        assert_eq!(info.customer_email.as_deref(), Some("buyer@example.com"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let info = classify_return(&params(&[("thank_you", "1"), ("order_id", "7")]));
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["isReturn"], true);
        assert_eq!(json["orderId"], "7");
        assert_eq!(json["status"], "success");
        assert_eq!(json["redirectTo"], "/order-confirmation?order_id=7");
        assert!(json.get("checkoutId").is_none());
    }
}
