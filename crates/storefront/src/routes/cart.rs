//! Cart route handlers.
//!
//! Each restaurant has its own cart in the session. Cart operations answer
//! htmx requests with fragments and plain form posts with a redirect back to
//! the menu.

use std::num::NonZeroU32;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use comanda_core::{Cart, CartLine, ConsumptionMethod, Price, ProductId};

use super::{MethodQuery, find_restaurant, is_htmx, menu_url};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::{load_cart, save_cart};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: String,
    pub item_count: u32,
    pub is_open: bool,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.to_string(),
            name: line.name.clone(),
            image_url: line.image_url.clone(),
            quantity: line.quantity.get(),
            unit_price: Price::brl(line.unit_price).display(),
            line_total: Price::brl(line.line_total()).display(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            subtotal: cart.subtotal().display(),
            item_count: cart.total_quantity(),
            is_open: cart.is_open(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
    #[serde(rename = "consumptionMethod")]
    pub consumption_method: Option<String>,
}

/// Toggle form data; only used to redirect back to the right menu.
#[derive(Debug, Default, Deserialize)]
pub struct ToggleCartForm {
    #[serde(rename = "consumptionMethod")]
    pub consumption_method: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub slug: String,
    pub restaurant_name: String,
    pub method: ConsumptionMethod,
    pub cart: CartView,
}

/// Cart sheet fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_sheet.html")]
pub struct CartSheetTemplate {
    pub slug: String,
    pub method: ConsumptionMethod,
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub slug: String,
    pub count: u32,
}

/// Display the cart page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
    Query(query): Query<MethodQuery>,
) -> Result<Response> {
    let restaurant = find_restaurant(&state, &slug)?;
    let cart = load_cart(&session, &restaurant.slug).await?;

    Ok(CartShowTemplate {
        slug: restaurant.slug.to_string(),
        restaurant_name: restaurant.name.clone(),
        method: query.method(),
        cart: CartView::from(&cart),
    }
    .into_response())
}

/// Add a product to the cart, merging with an existing line.
///
/// Returns the count badge with an `HX-Trigger` for htmx requests, otherwise
/// redirects back to the menu.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Path(slug): Path<String>,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let restaurant = find_restaurant(&state, &slug)?;

    let quantity = NonZeroU32::new(form.quantity.unwrap_or(1))
        .ok_or_else(|| AppError::BadRequest("quantity must be at least 1".to_string()))?;
    let product_id = form
        .product_id
        .parse::<ProductId>()
        .map_err(|_| AppError::BadRequest(format!("invalid product id {}", form.product_id)))?;
    let product = restaurant
        .products()
        .find(|p| p.id == product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let mut cart = load_cart(&session, &restaurant.slug).await?;
    cart.add(CartLine {
        product_id: product.id,
        name: product.name.clone(),
        unit_price: product.price,
        image_url: product.image_url.clone(),
        quantity,
    });
    save_cart(&session, &restaurant.slug, &cart).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[
            ("slug", restaurant.slug.as_str()),
            ("product_id", product_id.to_string().as_str()),
        ]),
    );

    if is_htmx(&headers) {
        return Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate {
                slug: restaurant.slug.to_string(),
                count: cart.total_quantity(),
            },
        )
            .into_response());
    }

    let method = ConsumptionMethod::from_query(form.consumption_method.as_deref());
    Ok(Redirect::to(&menu_url(restaurant.slug.as_str(), method)).into_response())
}

/// Open or close the cart sheet.
#[instrument(skip(state, session, headers))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Path(slug): Path<String>,
    Form(form): Form<ToggleCartForm>,
) -> Result<Response> {
    let restaurant = find_restaurant(&state, &slug)?;
    let method = ConsumptionMethod::from_query(form.consumption_method.as_deref());

    let mut cart = load_cart(&session, &restaurant.slug).await?;
    cart.toggle();
    save_cart(&session, &restaurant.slug, &cart).await?;

    if is_htmx(&headers) {
        return Ok(CartSheetTemplate {
            slug: restaurant.slug.to_string(),
            method,
            cart: CartView::from(&cart),
        }
        .into_response());
    }

    Ok(Redirect::to(&menu_url(restaurant.slug.as_str(), method)).into_response())
}

/// Get the cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Response> {
    let restaurant = find_restaurant(&state, &slug)?;
    let cart = load_cart(&session, &restaurant.slug).await?;

    Ok(CartCountTemplate {
        slug: restaurant.slug.to_string(),
        count: cart.total_quantity(),
    }
    .into_response())
}
