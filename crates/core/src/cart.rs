//! Shopping cart for one restaurant menu.
//!
//! A cart is an ordered list of [`CartLine`]s with at most one line per
//! product. Adding a product that is already present bumps the existing
//! line's quantity in place; anything new is appended, so iteration order is
//! always first-insertion order.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// One product in the cart and how many of it were requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub image_url: String,
    pub quantity: NonZeroU32,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity.get())
    }
}

/// Cart contents plus whether the cart sheet is currently open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    is_open: bool,
}

impl Cart {
    /// Create an empty, closed cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            is_open: false,
        }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Consume the cart, keeping only its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Merge `new_line` into the cart.
    ///
    /// If a line for the same product exists its quantity grows by
    /// `new_line.quantity` and every other field of the existing line is
    /// kept. Otherwise `new_line` is appended.
    pub fn add(&mut self, new_line: CartLine) {
        match self
            .lines
            .iter_mut()
            .find(|line| line.product_id == new_line.product_id)
        {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(new_line.quantity.get())
                    .unwrap_or(NonZeroU32::MAX);
            }
            None => self.lines.push(new_line),
        }
    }

    /// Flip the open/closed flag.
    pub const fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Drop every line. The open flag is left alone.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity.get()))
    }

    /// Sum of all line totals, in BRL.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        Price::brl(self.lines.iter().map(CartLine::line_total).sum())
    }
}

/// Pure form of [`Cart::add`]: returns the cart with `new_line` merged in.
#[must_use]
pub fn add_line(mut cart: Cart, new_line: CartLine) -> Cart {
    cart.add(new_line);
    cart
}

/// Pure form of [`Cart::toggle`].
#[must_use]
pub fn toggle(mut cart: Cart) -> Cart {
    cart.toggle();
    cart
}
