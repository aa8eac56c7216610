use url::Url;

const SHOPIFY_HOST_SUFFIX: &str = ".myshopify.com";

/// Move a Shopify-hosted checkout URL onto a custom domain.
///
/// Only `*.myshopify.com` hosts are rewritten. The result is always `https`
/// with no explicit port; path, query, and fragment are kept. Returns the
/// input unchanged when no domain is configured, the URL does not parse, or
/// the host is not a Shopify host.
#[must_use]
pub fn transform_checkout_url(checkout_url: &str, custom_domain: Option<&str>) -> String {
    let Some(domain) = custom_domain.and_then(normalize_domain) else {
        return checkout_url.to_string();
    };

    let Ok(mut url) = Url::parse(checkout_url) else {
        return checkout_url.to_string();
    };

    let is_shopify_host = url
        .host_str()
        .is_some_and(|host| host.to_ascii_lowercase().ends_with(SHOPIFY_HOST_SUFFIX));
    if !is_shopify_host {
        return checkout_url.to_string();
    }

    if url.set_host(Some(domain)).is_err()
        || url.set_scheme("https").is_err()
        || url.set_port(None).is_err()
    {
        return checkout_url.to_string();
    }

    url.into()
}

/// Accepts `checkout.example.com` or `https://checkout.example.com/`.
fn normalize_domain(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let host = without_scheme.trim_end_matches('/');
    (!host.is_empty()).then_some(host)
}
