//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - Restaurant list
//! GET  /products?q=                        - Product search across restaurants
//!
//! # Restaurant
//! GET  /{slug}                             - Landing: choose dine-in or takeaway
//! GET  /{slug}/menu?consumptionMethod=     - Menu by category
//! GET  /{slug}/menu/{product_id}           - Product detail
//!
//! # Cart (HTMX fragments)
//! GET  /{slug}/cart                        - Cart page
//! POST /{slug}/cart/add                    - Add or merge a line (count badge, triggers cart-updated)
//! POST /{slug}/cart/toggle                 - Open or close the cart sheet
//! GET  /{slug}/cart/count                  - Cart count badge (fragment)
//!
//! # Order
//! GET  /{slug}/order/finish                - Finish-order form
//! POST /{slug}/order/finish                - Submit (rate limited)
//! ```

pub mod cart;
pub mod home;
pub mod menu;
pub mod order;
pub mod products;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};
use serde::Deserialize;

use comanda_core::ConsumptionMethod;

use crate::error::{AppError, Result};
use crate::menu::Restaurant;
use crate::middleware::order_rate_limiter;
use crate::state::AppState;

/// `?consumptionMethod=` as carried between restaurant pages.
#[derive(Debug, Default, Deserialize)]
pub struct MethodQuery {
    #[serde(rename = "consumptionMethod")]
    pub consumption_method: Option<String>,
}

impl MethodQuery {
    #[must_use]
    pub fn method(&self) -> ConsumptionMethod {
        ConsumptionMethod::from_query(self.consumption_method.as_deref())
    }
}

/// Look up a restaurant or fail with 404.
fn find_restaurant<'a>(state: &'a AppState, slug: &str) -> Result<&'a Restaurant> {
    state
        .menu()
        .restaurant(slug)
        .ok_or_else(|| AppError::NotFound(format!("restaurant {slug}")))
}

/// Whether the request was issued by htmx.
fn is_htmx(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some_and(|v| v == "true")
}

/// Menu page URL that keeps the chosen consumption method.
#[must_use]
pub fn menu_url(slug: &str, method: ConsumptionMethod) -> String {
    format!("/{slug}/menu?consumptionMethod={}", method.as_str())
}

/// Create the routes scoped to one restaurant.
pub fn restaurant_routes() -> Router<AppState> {
    Router::new()
        .route("/{slug}", get(menu::restaurant))
        .route("/{slug}/menu", get(menu::index))
        .route("/{slug}/menu/{product_id}", get(menu::product))
        .route("/{slug}/cart", get(cart::show))
        .route("/{slug}/cart/add", post(cart::add))
        .route("/{slug}/cart/toggle", post(cart::toggle))
        .route("/{slug}/cart/count", get(cart::count))
        .route(
            "/{slug}/order/finish",
            get(order::show).merge(post(order::submit).layer(order_rate_limiter())),
        )
}

/// Create all page routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products", get(products::index))
        .merge(restaurant_routes())
}
