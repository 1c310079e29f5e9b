//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::menu::Restaurant;
use crate::state::AppState;

/// Restaurant card on the home page.
#[derive(Clone)]
pub struct RestaurantCard {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub avatar_image_url: String,
}

impl From<&Restaurant> for RestaurantCard {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            slug: restaurant.slug.to_string(),
            name: restaurant.name.clone(),
            description: restaurant.description.clone(),
            avatar_image_url: restaurant.avatar_image_url.clone(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub restaurants: Vec<RestaurantCard>,
}

/// Display the restaurant list.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    HomeTemplate {
        restaurants: state.menu().restaurants().map(RestaurantCard::from).collect(),
    }
}
