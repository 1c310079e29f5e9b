//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! Adds restrictive security headers to all responses. Start locked down and
//! loosen only when specific functionality requires it.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::CspNonce;
use crate::state::AppState;

/// Origin htmx is loaded from.
const HTMX_ORIGIN: &str = "https://unpkg.com";

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY` - Prevent clickjacking
/// - `X-Content-Type-Options: nosniff` - Prevent MIME sniffing
/// - `Referrer-Policy: no-referrer` - Zero referrer leakage
/// - `Content-Security-Policy` - See [`content_security_policy`]
/// - `Permissions-Policy` - Deny sensitive features
/// - `Cache-Control: no-store, max-age=0` - Carts and forms must not be cached
/// - `Cross-Origin-Opener-Policy: same-origin` - Process isolation
/// - `Cross-Origin-Resource-Policy: same-origin` - Resource isolation
/// - `X-DNS-Prefetch-Control: off` - Prevent DNS prefetch leakage
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let nonce = response
        .extensions()
        .get::<CspNonce>()
        .map(|n| n.value().to_string());
    let checkout_origin = state
        .config()
        .payment
        .checkout_url
        .origin()
        .ascii_serialization();
    let csp = content_security_policy(
        nonce.as_deref(),
        &checkout_origin,
        state.config().is_secure(),
    );

    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));

    match HeaderValue::from_str(&csp) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => {
            tracing::error!("Invalid CSP header value: {e}");
            headers.insert(
                CONTENT_SECURITY_POLICY,
                HeaderValue::from_static("default-src 'self'"),
            );
        }
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), \
             autoplay=(), \
             browsing-topics=(), \
             camera=(), \
             display-capture=(), \
             geolocation=(), \
             gyroscope=(), \
             hid=(), \
             interest-cohort=(), \
             magnetometer=(), \
             microphone=(), \
             midi=(), \
             payment=(), \
             publickey-credentials-get=(), \
             serial=(), \
             usb=(), \
             xr-spatial-tracking=()",
        ),
    );

    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("x-dns-prefetch-control"),
        HeaderValue::from_static("off"),
    );

    response
}

/// Build the CSP for one response.
///
/// ```text
/// default-src 'none';
/// script-src 'self' https://unpkg.com ['nonce-…'];
/// style-src 'self';
/// font-src 'self';
/// img-src 'self' https: data:;
/// connect-src 'self';
/// frame-src 'none';
/// object-src 'none';
/// base-uri 'self';
/// form-action 'self' {checkout origin};
/// frame-ancestors 'none'
/// [; upgrade-insecure-requests]
/// ```
///
/// `form-action` must allow the checkout origin because browsers apply it to
/// the redirect that follows the finish-order POST.
#[must_use]
pub fn content_security_policy(nonce: Option<&str>, checkout_origin: &str, secure: bool) -> String {
    let script_src = match nonce.filter(|n| !n.is_empty()) {
        Some(nonce) => format!("'self' {HTMX_ORIGIN} 'nonce-{nonce}'"),
        None => format!("'self' {HTMX_ORIGIN}"),
    };

    let mut directives = vec![
        "default-src 'none'".to_string(),
        format!("script-src {script_src}"),
        "style-src 'self'".to_string(),
        "font-src 'self'".to_string(),
        "img-src 'self' https: data:".to_string(),
        "connect-src 'self'".to_string(),
        "frame-src 'none'".to_string(),
        "object-src 'none'".to_string(),
        "base-uri 'self'".to_string(),
        format!("form-action 'self' {checkout_origin}"),
        "frame-ancestors 'none'".to_string(),
    ];
    if secure {
        directives.push("upgrade-insecure-requests".to_string());
    }

    directives.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_with_nonce() {
        let csp = content_security_policy(Some("abc123=="), "https://checkout.stripe.com", true);
        assert!(csp.contains("script-src 'self' https://unpkg.com 'nonce-abc123=='"));
        assert!(csp.contains("form-action 'self' https://checkout.stripe.com"));
        assert!(csp.ends_with("upgrade-insecure-requests"));
    }

    #[test]
    fn test_csp_without_nonce() {
        let csp = content_security_policy(None, "https://checkout.stripe.com", false);
        assert!(csp.contains("script-src 'self' https://unpkg.com;"));
        assert!(!csp.contains("nonce"));
        assert!(!csp.contains("upgrade-insecure-requests"));

        let empty = content_security_policy(Some(""), "https://checkout.stripe.com", false);
        assert!(!empty.contains("nonce"));
    }
}
