//! Session-stored visitor state.
//!
//! Carts are kept per restaurant so a visitor browsing two restaurants in the
//! same browser never mixes their orders. Nothing here outlives the session
//! store, which is in-memory.

use tower_sessions::Session;
use tower_sessions::session::Error;

use comanda_core::{Cart, Slug, SubmissionState};

/// Session keys for visitor data.
pub mod keys {
    /// Prefix for per-restaurant cart keys (`cart:{slug}`).
    pub const CART_PREFIX: &str = "cart:";

    /// Key for the order submission state machine.
    pub const ORDER_SUBMISSION: &str = "order_submission";
}

/// Session key for one restaurant's cart.
#[must_use]
pub fn cart_key(slug: &Slug) -> String {
    format!("{}{slug}", keys::CART_PREFIX)
}

/// Load a restaurant's cart, or an empty one.
///
/// # Errors
///
/// Returns an error if the session store fails or the stored value is corrupt.
pub async fn load_cart(session: &Session, slug: &Slug) -> Result<Cart, Error> {
    Ok(session
        .get::<Cart>(&cart_key(slug))
        .await?
        .unwrap_or_default())
}

/// Store a restaurant's cart.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_cart(session: &Session, slug: &Slug, cart: &Cart) -> Result<(), Error> {
    session.insert(&cart_key(slug), cart).await
}

/// Load the submission state, defaulting to `Idle`.
///
/// # Errors
///
/// Returns an error if the session store fails or the stored value is corrupt.
pub async fn load_submission(session: &Session) -> Result<SubmissionState, Error> {
    Ok(session
        .get::<SubmissionState>(keys::ORDER_SUBMISSION)
        .await?
        .unwrap_or_default())
}

/// Store the submission state.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_submission(session: &Session, state: &SubmissionState) -> Result<(), Error> {
    session.insert(keys::ORDER_SUBMISSION, state).await
}
