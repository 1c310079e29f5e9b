//! Order-creation API client.
//!
//! Orders are created by an external service that answers with a hosted
//! checkout session id:
//!
//! ```text
//! POST {ORDER_API_URL}/orders
//! { "name": "...", "cpf": "52998224725", "products": [{ "id": "...", "quantity": 2 }],
//!   "slug": "fsw-donalds", "consumptionMethod": "DINE_IN" }
//!
//! 200 OK
//! { "sessionId": "cs_test_..." }
//! ```

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use comanda_core::{ConsumptionMethod, Cpf, OrderLine, OrderRequest, Slug};

use crate::config::OrderApiConfig;

/// Errors that can occur when creating an order.
#[derive(Debug, Error)]
pub enum OrderGatewayError {
    /// HTTP request failed (connection, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the response or build the request.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A created order's hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: String,
}

/// Something that can turn an [`OrderRequest`] into a checkout session.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Create the order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order could not be created for any reason.
    async fn create_order(&self, order: &OrderRequest)
    -> Result<CheckoutSession, OrderGatewayError>;
}

/// Request body for `POST /orders`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderPayload<'a> {
    name: &'a str,
    cpf: &'a Cpf,
    products: Vec<OrderLine>,
    slug: &'a Slug,
    consumption_method: ConsumptionMethod,
}

impl<'a> From<&'a OrderRequest> for CreateOrderPayload<'a> {
    fn from(order: &'a OrderRequest) -> Self {
        Self {
            name: order.customer_name(),
            cpf: order.customer_tax_id(),
            products: order.products(),
            slug: order.store_slug(),
            consumption_method: order.consumption_method(),
        }
    }
}

/// [`OrderGateway`] backed by the HTTP order API.
#[derive(Debug, Clone)]
pub struct HttpOrderGateway {
    client: reqwest::Client,
    orders_url: Url,
}

impl HttpOrderGateway {
    /// Create a new order API client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value, the base URL
    /// cannot be extended, or the HTTP client fails to build.
    pub fn new(config: &OrderApiConfig) -> Result<Self, OrderGatewayError> {
        let mut headers = HeaderMap::new();

        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))
                .map_err(|e| OrderGatewayError::Parse(format!("Invalid API key format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            orders_url: orders_url(&config.base_url)?,
        })
    }

    /// The endpoint orders are posted to.
    #[must_use]
    pub const fn orders_url(&self) -> &Url {
        &self.orders_url
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    #[tracing::instrument(skip_all, fields(slug = %order.store_slug(), lines = order.lines().len()))]
    async fn create_order(
        &self,
        order: &OrderRequest,
    ) -> Result<CheckoutSession, OrderGatewayError> {
        let payload = CreateOrderPayload::from(order);

        let response = self
            .client
            .post(self.orders_url.clone())
            .json(&payload)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OrderGatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| OrderGatewayError::Parse(e.to_string()))?;

        if session.session_id.trim().is_empty() {
            return Err(OrderGatewayError::Parse(
                "response carried an empty sessionId".to_string(),
            ));
        }

        tracing::info!(session_id = %session.session_id, "Order created");
        Ok(session)
    }
}

/// `{base}/orders`, tolerating a trailing slash on the base.
fn orders_url(base: &Url) -> Result<Url, OrderGatewayError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| OrderGatewayError::Parse(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .push("orders");
    Ok(url)
}
