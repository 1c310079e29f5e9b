//! Integration test harness for the Comanda storefront.
//!
//! [`TestApp::spawn`] boots the real router on an ephemeral port with the
//! bundled menus and a [`FakeOrderGateway`] in place of the order API. Tests
//! drive it with a cookie-aware client that does not follow redirects, so
//! checkout redirects can be asserted directly.
//!
//! ```rust,ignore
//! let app = TestApp::spawn(TestOptions::default()).await;
//! let response = app.get("/fsw-donalds/menu").await;
//! assert_eq!(response.status(), 200);
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use comanda_core::{ConsumptionMethod, OrderLine, OrderRequest};
use comanda_storefront::config::StorefrontConfig;
use comanda_storefront::menu::MenuStore;
use comanda_storefront::services::{CheckoutSession, OrderGateway, OrderGatewayError};
use comanda_storefront::state::AppState;
use tokio::sync::Notify;

/// Restaurant present in the bundled menus.
pub const SLUG: &str = "fsw-donalds";
/// "McOferta Média Big Mac Duplo", R$ 39,90.
pub const MCOFERTA: &str = "9d6a1e2f-3b4c-4d5e-8f6a-7b8c9d0e1f01";
/// "Coca-Cola", R$ 5,90.
pub const COCA_COLA: &str = "9d6a1e2f-3b4c-4d5e-8f6a-7b8c9d0e1f05";
/// A CPF with valid check digits.
pub const VALID_CPF: &str = "529.982.247-25";

/// What the order API saw, reduced to comparable values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedOrder {
    pub name: String,
    pub cpf: String,
    pub slug: String,
    pub consumption_method: ConsumptionMethod,
    pub products: Vec<OrderLine>,
}

impl From<&OrderRequest> for RecordedOrder {
    fn from(order: &OrderRequest) -> Self {
        Self {
            name: order.customer_name().to_string(),
            cpf: order.customer_tax_id().as_str().to_string(),
            slug: order.store_slug().to_string(),
            consumption_method: order.consumption_method(),
            products: order.products(),
        }
    }
}

/// In-process stand-in for the order API.
pub struct FakeOrderGateway {
    outcome: Result<String, u16>,
    orders: Mutex<Vec<RecordedOrder>>,
    entered: Notify,
    gate: Option<Notify>,
}

impl FakeOrderGateway {
    /// Every order succeeds with `session_id`.
    #[must_use]
    pub fn succeeding(session_id: &str) -> Self {
        Self {
            outcome: Ok(session_id.to_string()),
            orders: Mutex::new(Vec::new()),
            entered: Notify::new(),
            gate: None,
        }
    }

    /// Every order fails with an API error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            outcome: Err(503),
            ..Self::succeeding("")
        }
    }

    /// Orders wait for [`FakeOrderGateway::release`] before answering.
    #[must_use]
    pub fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    /// Let one gated order through.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Wait until an order call has started.
    pub async fn wait_for_call(&self) {
        self.entered.notified().await;
    }

    #[must_use]
    pub fn orders(&self) -> Vec<RecordedOrder> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderGateway for FakeOrderGateway {
    async fn create_order(
        &self,
        order: &OrderRequest,
    ) -> Result<CheckoutSession, OrderGatewayError> {
        self.orders.lock().unwrap().push(RecordedOrder::from(order));
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match &self.outcome {
            Ok(session_id) => Ok(CheckoutSession {
                session_id: session_id.clone(),
            }),
            Err(status) => Err(OrderGatewayError::Api {
                status: *status,
                message: "order service unavailable".to_string(),
            }),
        }
    }
}

/// Knobs for [`TestApp::spawn`].
pub struct TestOptions {
    pub gateway: Arc<FakeOrderGateway>,
    pub payment_public_key: Option<&'static str>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            gateway: Arc::new(FakeOrderGateway::succeeding("cs_test_123")),
            payment_public_key: Some("pk_test_51Hx"),
        }
    }
}

/// A running storefront plus a client bound to one browsing session.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub gateway: Arc<FakeOrderGateway>,
}

fn storefront_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../storefront")
}

/// Storefront configuration built only from `vars`, ignoring the process env.
#[must_use]
pub fn config(vars: &[(&str, &str)]) -> StorefrontConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    StorefrontConfig::from_lookup(move |key: &str| vars.get(key).cloned()).unwrap()
}

/// Serve `router` on an ephemeral local port and return its address.
pub async fn serve(router: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    addr
}

impl TestApp {
    pub async fn spawn(options: TestOptions) -> Self {
        let mut vars = Vec::new();
        if let Some(key) = options.payment_public_key {
            vars.push(("PAYMENT_PUBLIC_KEY", key));
        }
        let config = config(&vars);

        let menu = MenuStore::load(&storefront_dir().join("menu")).unwrap();
        let gateway: Arc<dyn OrderGateway> = options.gateway.clone();
        let state = AppState::new(config, menu, gateway);
        let router = comanda_storefront::app(state, &storefront_dir().join("static"));

        let addr = serve(router).await;

        Self {
            base_url: format!("http://{addr}"),
            client: Self::new_client(),
            gateway: options.gateway,
        }
    }

    /// A client with its own cookie jar (a separate browsing session).
    #[must_use]
    pub fn new_client() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap()
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// Add a product via the htmx path and return the badge count it reports.
    pub async fn add_to_cart(&self, slug: &str, product_id: &str, quantity: u32) -> u32 {
        let quantity = quantity.to_string();
        let response = self
            .client
            .post(self.url(&format!("/{slug}/cart/add")))
            .header("HX-Request", "true")
            .form(&[("product_id", product_id), ("quantity", quantity.as_str())])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        badge_count(&response.text().await.unwrap())
    }

    pub async fn cart_count(&self, slug: &str) -> u32 {
        let body = self
            .get(&format!("/{slug}/cart/count"))
            .await
            .text()
            .await
            .unwrap();
        badge_count(&body)
    }

    /// Post the finish-order form.
    pub async fn submit_order(
        &self,
        slug: &str,
        method: Option<&str>,
        name: &str,
        cpf: &str,
    ) -> reqwest::Response {
        let path = method.map_or_else(
            || format!("/{slug}/order/finish"),
            |m| format!("/{slug}/order/finish?consumptionMethod={m}"),
        );
        self.post_form(&path, &[("name", name), ("cpf", cpf)]).await
    }
}

/// Parse the number out of the cart count badge fragment.
#[must_use]
pub fn badge_count(body: &str) -> u32 {
    let end = body.rfind("</span>").unwrap();
    let start = body[..end].rfind('>').unwrap() + 1;
    body[start..end].trim().parse().unwrap()
}
