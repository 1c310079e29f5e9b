//! Restaurant landing, menu, and product pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use comanda_core::{ConsumptionMethod, ProductId};

use super::cart::CartView;
use super::{MethodQuery, find_restaurant};
use crate::error::{AppError, Result};
use crate::filters;
use crate::menu::{MenuCategory, Product, Restaurant};
use crate::models::load_cart;
use crate::state::AppState;

/// Restaurant header data for templates.
#[derive(Clone)]
pub struct RestaurantView {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub avatar_image_url: String,
    pub cover_image_url: String,
}

impl From<&Restaurant> for RestaurantView {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            slug: restaurant.slug.to_string(),
            name: restaurant.name.clone(),
            description: restaurant.description.clone(),
            avatar_image_url: restaurant.avatar_image_url.clone(),
            cover_image_url: restaurant.cover_image_url.clone(),
        }
    }
}

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
    pub ingredients: Vec<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price().display(),
            image_url: product.image_url.clone(),
            ingredients: product.ingredients.clone(),
        }
    }
}

/// Category display data for templates.
#[derive(Clone)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub products: Vec<ProductView>,
}

impl From<&MenuCategory> for CategoryView {
    fn from(category: &MenuCategory) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            products: category.products.iter().map(ProductView::from).collect(),
        }
    }
}

/// Restaurant landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu/restaurant.html")]
pub struct RestaurantTemplate {
    pub restaurant: RestaurantView,
    pub methods: [ConsumptionMethod; 2],
}

/// Menu page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu/index.html")]
pub struct MenuTemplate {
    pub slug: String,
    pub restaurant: RestaurantView,
    pub categories: Vec<CategoryView>,
    pub method: ConsumptionMethod,
    pub cart: CartView,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu/product.html")]
pub struct ProductTemplate {
    pub slug: String,
    pub restaurant: RestaurantView,
    pub product: ProductView,
    pub method: ConsumptionMethod,
    pub cart: CartView,
}

/// Display the landing page where the visitor picks how they will eat.
#[instrument(skip(state))]
pub async fn restaurant(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response> {
    let restaurant = find_restaurant(&state, &slug)?;

    Ok(RestaurantTemplate {
        restaurant: RestaurantView::from(restaurant),
        methods: [ConsumptionMethod::DineIn, ConsumptionMethod::Takeaway],
    }
    .into_response())
}

/// Display the menu grouped by category.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
    Query(query): Query<MethodQuery>,
) -> Result<Response> {
    let restaurant = find_restaurant(&state, &slug)?;
    let cart = load_cart(&session, &restaurant.slug).await?;

    Ok(MenuTemplate {
        slug: restaurant.slug.to_string(),
        restaurant: RestaurantView::from(restaurant),
        categories: restaurant.categories.iter().map(CategoryView::from).collect(),
        method: query.method(),
        cart: CartView::from(&cart),
    }
    .into_response())
}

/// Display one product with its add-to-cart form.
#[instrument(skip(state, session))]
pub async fn product(
    State(state): State<AppState>,
    session: Session,
    Path((slug, product_id)): Path<(String, String)>,
    Query(query): Query<MethodQuery>,
) -> Result<Response> {
    let restaurant = find_restaurant(&state, &slug)?;
    let product = product_id
        .parse::<ProductId>()
        .ok()
        .and_then(|id| restaurant.products().find(|p| p.id == id))
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
    let cart = load_cart(&session, &restaurant.slug).await?;

    Ok(ProductTemplate {
        slug: restaurant.slug.to_string(),
        restaurant: RestaurantView::from(restaurant),
        product: ProductView::from(product),
        method: query.method(),
        cart: CartView::from(&cart),
    }
    .into_response())
}
