//! Restaurant menus loaded from JSON files at startup.
//!
//! Each `*.json` file in the menu directory describes one restaurant:
//!
//! ```json
//! {
//!   "id": "6f1c...",
//!   "slug": "fsw-donalds",
//!   "name": "FSW Donalds",
//!   "description": "O melhor fast food do mundo",
//!   "avatarImageUrl": "/static/images/fsw-donalds/avatar.png",
//!   "coverImageUrl": "/static/images/fsw-donalds/cover.png",
//!   "categories": [
//!     { "id": "...", "name": "Combos", "products": [
//!       { "id": "...", "name": "McOferta", "description": "...",
//!         "price": "39.90", "imageUrl": "...", "ingredients": ["Pão"] }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Menus are read once and kept in memory. A file that fails to parse is
//! logged and skipped so one bad menu does not take the site down.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;

use comanda_core::{CategoryId, Price, ProductId, RestaurantId, Slug};

/// A restaurant and its full menu.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: RestaurantId,
    pub slug: Slug,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub avatar_image_url: String,
    #[serde(default)]
    pub cover_image_url: String,
    #[serde(default)]
    pub categories: Vec<MenuCategory>,
}

impl Restaurant {
    /// Every product on the menu, in category order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.categories.iter().flat_map(|c| c.products.iter())
    }
}

/// A named group of products (e.g. "Combos", "Bebidas").
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCategory {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub products: Vec<Product>,
}

/// A single menu item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

impl Product {
    #[must_use]
    pub const fn price(&self) -> Price {
        Price::brl(self.price)
    }
}

/// Errors that can occur while loading menus.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate restaurant slug: {0}")]
    DuplicateSlug(Slug),
}

/// In-memory catalog of every restaurant, keyed by slug.
#[derive(Debug, Clone, Default)]
pub struct MenuStore {
    restaurants: Arc<BTreeMap<Slug, Restaurant>>,
}

impl MenuStore {
    /// Load every `*.json` menu from `dir`.
    ///
    /// A missing directory yields an empty store. Files that fail to parse
    /// are skipped with an error log.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or if two files
    /// declare the same slug.
    pub fn load(dir: &Path) -> Result<Self, MenuError> {
        if !dir.exists() {
            tracing::warn!("Menu directory does not exist: {:?}", dir);
            return Ok(Self::default());
        }

        let mut restaurants = Vec::new();
        for entry in std::fs::read_dir(dir)?.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            match Self::load_restaurant(&path) {
                Ok(restaurant) => {
                    tracing::info!(
                        slug = %restaurant.slug,
                        products = restaurant.products().count(),
                        "Loaded menu"
                    );
                    restaurants.push(restaurant);
                }
                Err(e) => {
                    tracing::error!("Failed to load menu {:?}: {}", path, e);
                }
            }
        }

        Self::from_restaurants(restaurants)
    }

    fn load_restaurant(path: &Path) -> Result<Restaurant, MenuError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| MenuError::Parse {
            file: path.display().to_string(),
            source,
        })
    }

    /// Build a store from already-parsed restaurants.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::DuplicateSlug`] if two restaurants share a slug.
    pub fn from_restaurants(
        restaurants: impl IntoIterator<Item = Restaurant>,
    ) -> Result<Self, MenuError> {
        let mut map = BTreeMap::new();
        for restaurant in restaurants {
            let slug = restaurant.slug.clone();
            if map.insert(slug.clone(), restaurant).is_some() {
                return Err(MenuError::DuplicateSlug(slug));
            }
        }

        Ok(Self {
            restaurants: Arc::new(map),
        })
    }

    /// All restaurants, ordered by slug.
    pub fn restaurants(&self) -> impl Iterator<Item = &Restaurant> {
        self.restaurants.values()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    /// Look up a restaurant by slug.
    #[must_use]
    pub fn restaurant(&self, slug: &str) -> Option<&Restaurant> {
        let slug = Slug::parse(slug).ok()?;
        self.restaurants.get(&slug)
    }

    /// Look up a product on one restaurant's menu.
    #[must_use]
    pub fn product(&self, slug: &str, product_id: ProductId) -> Option<&Product> {
        self.restaurant(slug)?
            .products()
            .find(|product| product.id == product_id)
    }

    /// Case-insensitive substring search over product names and descriptions
    /// across every restaurant. A blank query matches everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<(&Restaurant, &Product)> {
        let needle = query.trim().to_lowercase();

        self.restaurants()
            .flat_map(|restaurant| restaurant.products().map(move |p| (restaurant, p)))
            .filter(|(_, product)| {
                needle.is_empty()
                    || product.name.to_lowercase().contains(&needle)
                    || product.description.to_lowercase().contains(&needle)
            })
            .collect()
    }
}
