//! Hosted checkout redirect.

use url::Url;

use crate::config::PaymentConfig;

/// Builds the hosted checkout URL for a created order.
///
/// Disabled when no publishable key is configured; the order is still
/// created, the customer just isn't sent anywhere.
#[derive(Debug, Clone)]
pub struct PaymentRedirect {
    checkout_url: Url,
    enabled: bool,
}

impl PaymentRedirect {
    #[must_use]
    pub const fn new(checkout_url: Url, enabled: bool) -> Self {
        Self {
            checkout_url,
            enabled,
        }
    }

    #[must_use]
    pub fn from_config(config: &PaymentConfig) -> Self {
        Self::new(config.checkout_url.clone(), config.public_key.is_some())
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `{checkout_url}/{session_id}`, or `None` when redirects are disabled.
    #[must_use]
    pub fn checkout_url(&self, session_id: &str) -> Option<Url> {
        if !self.enabled {
            return None;
        }

        let mut url = self.checkout_url.clone();
        url.path_segments_mut().ok()?.pop_if_empty().push(session_id);
        Some(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn redirect(enabled: bool) -> PaymentRedirect {
        PaymentRedirect::new(
            Url::parse("https://checkout.stripe.com/c/pay").unwrap(),
            enabled,
        )
    }

    #[test]
    fn test_checkout_url() {
        let url = redirect(true).checkout_url("cs_test_a1B2").unwrap();
        assert_eq!(url.as_str(), "https://checkout.stripe.com/c/pay/cs_test_a1B2");
    }

    #[test]
    fn test_session_id_is_escaped() {
        let url = redirect(true).checkout_url("a/b c").unwrap();
        assert_eq!(url.as_str(), "https://checkout.stripe.com/c/pay/a%2Fb%20c");
    }

    #[test]
    fn test_disabled_without_public_key() {
        let config = PaymentConfig {
            public_key: None,
            checkout_url: Url::parse("https://checkout.stripe.com/c/pay").unwrap(),
        };
        let redirect = PaymentRedirect::from_config(&config);
        assert!(!redirect.is_enabled());
        assert!(redirect.checkout_url("cs_test_a1B2").is_none());
    }
}
