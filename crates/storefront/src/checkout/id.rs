use shopfront_core::ShopifyGid;
use url::Url;

/// Recover the checkout GID from a hosted checkout URL.
///
/// The segment after `checkouts` is the checkout token; anything else about
/// the URL (host, query, trailing segments) is ignored. Returns `None` when
/// the URL does not parse or has no non-empty segment after `checkouts`.
#[must_use]
pub fn extract_checkout_id(checkout_url: &str) -> Option<ShopifyGid> {
    let url = Url::parse(checkout_url).ok()?;
    let mut segments = url.path_segments()?;
    segments.find(|segment| *segment == "checkouts")?;

    match segments.next() {
        Some(token) if !token.is_empty() => Some(ShopifyGid::checkout(token)),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_token_after_checkouts() {
        let cases = [
            ("https://shop.myshopify.com/1234/checkouts/abc123", "abc123"),
            ("https://shop.myshopify.com/1234/checkouts/abc123?key=deadbeef", "abc123"),
            ("https://shop.myshopify.com/checkouts/c1/thank_you", "c1"),
            ("https://checkout.example.com/55/checkouts/Z9-x_", "Z9-x_"),
        ];
        for (url, token) in cases {
            let gid = extract_checkout_id(url).unwrap();
            assert_eq!(gid.to_string(), format!("gid://shopify/Checkout/{token}"), "{url}");
        }
    }

    #[test]
    fn test_missing_checkouts_segment() {
        assert!(extract_checkout_id("https://shop.myshopify.com/cart/123").is_none());
        assert!(extract_checkout_id("https://shop.myshopify.com/").is_none());
        assert!(extract_checkout_id("https://shop.myshopify.com/checkout/abc").is_none());
    }

    #[test]
    fn test_checkouts_without_token() {
        assert!(extract_checkout_id("https://shop.myshopify.com/1/checkouts").is_none());
        assert!(extract_checkout_id("https://shop.myshopify.com/1/checkouts/").is_none());
        assert!(extract_checkout_id("https://shop.myshopify.com/1/checkouts//abc").is_none());
    }

    #[test]
    fn test_unparseable_url() {
        assert!(extract_checkout_id("").is_none());
        assert!(extract_checkout_id("not a url").is_none());
        assert!(extract_checkout_id("/1234/checkouts/abc").is_none());
    }
}
