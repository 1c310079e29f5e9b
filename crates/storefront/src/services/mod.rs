//! External collaborators for the storefront.
//!
//! - [`orders`] - Order-creation API client behind the [`OrderGateway`] trait
//! - [`payment`] - Hosted checkout redirect
//! - [`submission_locks`] - One order submission at a time per session

pub mod orders;
pub mod payment;
pub mod submission_locks;

pub use orders::{CheckoutSession, HttpOrderGateway, OrderGateway, OrderGatewayError};
pub use payment::PaymentRedirect;
pub use submission_locks::SubmissionLocks;
