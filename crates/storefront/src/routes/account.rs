//! Shopify customer login and logout.
//!
//! Credentials are exchanged for a Shopify customer access token, which is
//! kept in the visitor's session so checkout can attach the buyer identity.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shopfront_core::Email;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user};
use crate::middleware::{clear_shopify_customer_token, set_shopify_customer_token};
use crate::shopify::ShopifyError;
use crate::state::AppState;

/// Landing page after login when no usable return URL was given.
const DEFAULT_RETURN_PATH: &str = "/account";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub return_url: Option<String>,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("return_url", &self.return_url)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub redirect_to: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Exchange email and password for a customer access token.
///
/// # Route
///
/// `POST /api/account/login`
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let email = Email::parse(&request.email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    if request.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".to_string()));
    }

    let token = state
        .storefront()
        .create_customer_access_token(email.as_str(), &request.password)
        .await
        .map_err(|e| match e {
            ShopifyError::UserError(msg) => {
                tracing::info!("Customer login rejected: {msg}");
                AppError::Unauthorized("Invalid email or password".to_string())
            }
            other => AppError::Shopify(other),
        })?;

    set_shopify_customer_token(&session, &token).await?;
    add_breadcrumb("auth", "Customer logged in", None);

    Ok(Json(LoginResponse {
        redirect_to: safe_return_path(request.return_url.as_deref()),
    }))
}

/// Clear the customer session and revoke the token upstream.
///
/// Revocation is best effort; the session is cleared either way.
///
/// # Route
///
/// `POST /api/account/logout`
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Json<LogoutResponse>> {
    if let Some(token) = clear_shopify_customer_token(&session).await? {
        if let Err(e) = state
            .storefront()
            .delete_customer_access_token(&token.access_token)
            .await
        {
            tracing::warn!("Failed to revoke customer access token: {e}");
        }
    }

    clear_sentry_user();
    add_breadcrumb("auth", "Customer logged out", None);

    Ok(Json(LogoutResponse { success: true }))
}

/// Accept only same-site relative paths as post-login destinations.
///
/// Checkout sends guests here with the hosted checkout URL as the return
/// target; that becomes a relative `/checkout?url=` so preparation runs again
/// with the new customer session.
fn safe_return_path(return_url: Option<&str>) -> String {
    let Some(url) = return_url.map(str::trim).filter(|u| !u.is_empty()) else {
        return DEFAULT_RETURN_PATH.to_string();
    };

    if url.chars().any(char::is_control) {
        return DEFAULT_RETURN_PATH.to_string();
    }

    if url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\") {
        return url.to_string();
    }

    if is_shopify_checkout(url) {
        return format!("/checkout?url={}", urlencoding::encode(url));
    }

    DEFAULT_RETURN_PATH.to_string()
}

fn is_shopify_checkout(url: &str) -> bool {
    url::Url::parse(url).is_ok_and(|u| {
        u.scheme() == "https"
            && u.host_str()
                .is_some_and(|h| h.to_ascii_lowercase().ends_with(".myshopify.com"))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::routes::test_support::{TestApp, json_body, post_json, send};

    #[test]
    fn test_safe_return_path() {
        assert_eq!(safe_return_path(None), "/account");
        assert_eq!(safe_return_path(Some("")), "/account");
        assert_eq!(safe_return_path(Some("/cart")), "/cart");
        assert_eq!(safe_return_path(Some("/account/orders?page=2")), "/account/orders?page=2");
        assert_eq!(safe_return_path(Some("//evil.test")), "/account");
        assert_eq!(safe_return_path(Some("/\\evil.test")), "/account");
        assert_eq!(safe_return_path(Some("https://evil.test/")), "/account");
        assert_eq!(safe_return_path(Some("/cart\r\nSet-Cookie: x")), "/account");
        assert_eq!(
            safe_return_path(Some("http://shop.myshopify.com/1/checkouts/abc")),
            "/account"
        );
    }

    #[test]
    fn test_checkout_return_url_resumes_checkout() {
        let path = safe_return_path(Some("https://shop.myshopify.com/1/checkouts/abc?key=k"));
        assert_eq!(
            path,
            "/checkout?url=https%3A%2F%2Fshop.myshopify.com%2F1%2Fcheckouts%2Fabc%3Fkey%3Dk"
        );
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let request = LoginRequest {
            email: "buyer@example.com".to_string(),
            password: "hunter2".to_string(),
            return_url: None,
        };
        let debug = format!("{request:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_login_rejects_invalid_email() {
        let app = TestApp::default().router();
        let response = send(
            &app,
            post_json(
                "/api/account/login",
                &json!({ "email": "not-an-email", "password": "secret" }),
                None,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_login_requires_password() {
        let app = TestApp::default().router();
        let response = send(
            &app,
            post_json(
                "/api/account/login",
                &json!({ "email": "buyer@example.com", "password": "" }),
                None,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logout_without_session() {
        let app = TestApp::default().router();
        let response = send(&app, post_json("/api/account/logout", &json!({}), None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "success": true }));
    }
}
