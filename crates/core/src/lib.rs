//! Comanda Core - Shared types library.
//!
//! This crate provides the types and pure logic used by the Comanda
//! table-ordering storefront:
//! - `storefront` - Public-facing menu, cart, and checkout site
//! - `integration-tests` - End-to-end tests against the storefront router
//!
//! # Architecture
//!
//! The core crate contains only types and deterministic logic - no I/O, no
//! HTTP clients, no sessions. This keeps it lightweight and easy to test.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, CPF, slugs, consumption method
//! - [`cart`] - Cart lines and the find-or-append merge
//! - [`order`] - Finish-order form validation and the immutable order request
//! - [`checkout`] - Submission state machine (one submission in flight at a time)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod order;
pub mod types;

pub use cart::{Cart, CartLine, add_line};
pub use checkout::{SubmissionError, SubmissionState};
pub use order::{Customer, CustomerForm, FieldErrors, OrderError, OrderLine, OrderRequest};
pub use types::*;
