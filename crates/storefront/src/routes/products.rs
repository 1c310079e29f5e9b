//! Product search across every restaurant.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::menu::{Product, Restaurant};
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// One search hit, linked back to its restaurant's menu.
#[derive(Clone)]
pub struct ProductHit {
    pub restaurant_slug: String,
    pub restaurant_name: String,
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
}

impl ProductHit {
    fn new(restaurant: &Restaurant, product: &Product) -> Self {
        Self {
            restaurant_slug: restaurant.slug.to_string(),
            restaurant_name: restaurant.name.clone(),
            product_id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price().display(),
            image_url: product.image_url.clone(),
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub query: String,
    pub hits: Vec<ProductHit>,
}

/// Display every product, optionally filtered by `q`.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let query = query.q.unwrap_or_default();
    let hits = state
        .menu()
        .search(&query)
        .into_iter()
        .map(|(restaurant, product)| ProductHit::new(restaurant, product))
        .collect();

    ProductsIndexTemplate { query, hits }
}
