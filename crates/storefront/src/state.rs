//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::menu::{MenuError, MenuStore};
use crate::services::{
    HttpOrderGateway, OrderGateway, OrderGatewayError, PaymentRedirect, SubmissionLocks,
};

/// Error building application state from configuration.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("menu error: {0}")]
    Menu(#[from] MenuError),
    #[error("order gateway error: {0}")]
    OrderGateway(#[from] OrderGatewayError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Per-visitor state (carts,
/// submissions) lives in the session; only the submission locks are shared
/// mutable state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    menu: MenuStore,
    orders: Arc<dyn OrderGateway>,
    payment: PaymentRedirect,
    submission_locks: SubmissionLocks,
}

impl AppState {
    /// Create application state from its parts.
    ///
    /// The order gateway is injected so tests can substitute a fake.
    #[must_use]
    pub fn new(config: StorefrontConfig, menu: MenuStore, orders: Arc<dyn OrderGateway>) -> Self {
        let payment = PaymentRedirect::from_config(&config.payment);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                menu,
                orders,
                payment,
                submission_locks: SubmissionLocks::new(),
            }),
        }
    }

    /// Load menus and build the HTTP order gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the menu directory cannot be read or the order
    /// API client cannot be built.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, StateError> {
        let menu = MenuStore::load(&config.menu_dir)?;
        let orders = HttpOrderGateway::new(&config.order_api)?;
        Ok(Self::new(config, menu, Arc::new(orders)))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the restaurant catalog.
    #[must_use]
    pub fn menu(&self) -> &MenuStore {
        &self.inner.menu
    }

    /// Get the order-creation collaborator.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderGateway {
        self.inner.orders.as_ref()
    }

    /// Get the hosted checkout redirect builder.
    #[must_use]
    pub fn payment(&self) -> &PaymentRedirect {
        &self.inner.payment
    }

    /// Get the per-session order submission locks.
    #[must_use]
    pub fn submission_locks(&self) -> &SubmissionLocks {
        &self.inner.submission_locks
    }
}
