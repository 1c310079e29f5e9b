//! Domain models for the storefront.

pub mod session;

pub use session::{keys as session_keys, load_cart, load_submission, save_cart, save_submission};
