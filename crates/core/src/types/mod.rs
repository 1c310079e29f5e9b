//! Core types for Comanda.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod consumption;
pub mod cpf;
pub mod id;
pub mod price;
pub mod slug;

pub use consumption::ConsumptionMethod;
pub use cpf::{Cpf, CpfError, is_valid_cpf};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use slug::{Slug, SlugError};
