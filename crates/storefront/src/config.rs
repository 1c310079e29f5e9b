//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! Every variable is optional; the defaults are suitable for local development.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `MENU_DIR` - Directory of restaurant menu JSON files (default: crates/storefront/menu)
//! - `ORDER_API_URL` - Base URL of the order-creation API (default: <http://localhost:4000/api>)
//! - `ORDER_API_KEY` - Bearer token for the order API
//! - `ORDER_API_TIMEOUT_SECS` - Order API request timeout (default: 10)
//! - `PAYMENT_PUBLIC_KEY` - Hosted checkout publishable key; without it the
//!   payment redirect is skipped
//! - `PAYMENT_CHECKOUT_URL` - Hosted checkout base URL (default: <https://checkout.stripe.com/c/pay>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Directory holding one JSON file per restaurant
    pub menu_dir: PathBuf,
    /// Order-creation API configuration
    pub order_api: OrderApiConfig,
    /// Hosted checkout configuration
    pub payment: PaymentConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Order-creation API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct OrderApiConfig {
    /// Base URL; orders are posted to `{base_url}/orders`
    pub base_url: Url,
    /// Bearer token sent with every request
    pub api_key: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for OrderApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Hosted checkout configuration.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Publishable key. `None` disables the redirect.
    pub public_key: Option<String>,
    /// Checkout sessions are reached at `{checkout_url}/{session_id}`
    pub checkout_url: Url,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed or if the order API
    /// key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env
            .or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| invalid("STOREFRONT_HOST", &e))?;
        let port = env
            .or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| invalid("STOREFRONT_PORT", &e))?;
        let base_url = env.or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let menu_dir = PathBuf::from(env.or_default("MENU_DIR", "crates/storefront/menu"));

        let order_api = OrderApiConfig::from_env(&env)?;
        let payment = PaymentConfig::from_env(&env)?;

        Ok(Self {
            host,
            port,
            base_url,
            menu_dir,
            order_api,
            payment,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl OrderApiConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let base_url = env.url("ORDER_API_URL", "http://localhost:4000/api")?;

        let api_key = match env.optional("ORDER_API_KEY") {
            Some(key) => {
                validate_secret_strength(&key, "ORDER_API_KEY")?;
                Some(SecretString::from(key))
            }
            None => None,
        };

        let timeout_secs = env
            .or_default("ORDER_API_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| invalid("ORDER_API_TIMEOUT_SECS", &e))?;

        Ok(Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl PaymentConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            public_key: env.optional("PAYMENT_PUBLIC_KEY"),
            checkout_url: env.url("PAYMENT_CHECKOUT_URL", "https://checkout.stripe.com/c/pay")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Key lookup with the defaulting rules used above.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a URL variable with a default value.
    fn url(&self, key: &str, default: &str) -> Result<Url, ConfigError> {
        Url::parse(&self.or_default(key, default)).map_err(|e| invalid(key, &e))
    }
}

fn invalid(key: &str, err: &impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), err.to_string())
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

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated key."
            ),
        ));
    }

    Ok(())
}
