//! Cart aggregator.
//!
//! The cart is a pure value: every mutation updates the line list and both
//! totals together, so a reader never observes a line change without the
//! matching totals. Persistence is the caller's job.
//!
//! Invariants held after every operation:
//! - `total_quantity == Σ line.quantity`
//! - `total_price == Σ line.unit_price × line.quantity`
//! - at most one line per item id

use serde::{Deserialize, Serialize};

use super::id::CartItemId;
use super::price::Price;

/// Something that can be put in the cart (a product or a package).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product or package id.
    pub id: CartItemId,
    /// Display name.
    pub name: String,
    /// Price of one unit.
    #[serde(rename = "price")]
    pub unit_price: Price,
    /// Image reference (URL).
    #[serde(default, rename = "productImage")]
    pub image: Option<String>,
    /// Brand name, for products that have one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
}

/// A cart line: an item and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    pub quantity: u32,
}

impl CartLine {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.item.unit_price * self.quantity
    }
}

/// Ordered collection of cart lines with derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartLine>,
    total_quantity: u32,
    total_price: Price,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from lines, merging duplicate ids and dropping empty
    /// lines. Totals are derived from the lines, never trusted from input.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            cart.add_line(line.item, line.quantity);
        }
        cart
    }

    /// Re-derive a cart from a persisted snapshot whose totals may be stale.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::from_lines(self.items)
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.items
    }

    /// Look up a line by item id.
    #[must_use]
    pub fn line(&self, id: &CartItemId) -> Option<&CartLine> {
        self.items.iter().find(|line| &line.item.id == id)
    }

    /// Sum of all line quantities.
    #[must_use]
    pub const fn total_quantity(&self) -> u32 {
        self.total_quantity
    }

    /// Sum of all line totals.
    #[must_use]
    pub const fn total_price(&self) -> Price {
        self.total_price
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` of `item`. An existing line for the same id has its
    /// quantity increased; its stored unit price is kept.
    ///
    /// Returns `true` if the cart changed. A zero quantity, or one that would
    /// push the total quantity past `u32::MAX`, leaves the cart untouched.
    pub fn add_line(&mut self, item: CartItem, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        let Some(total_quantity) = self.total_quantity.checked_add(quantity) else {
            return false;
        };

        // Every line quantity is bounded by the total, so it cannot overflow
        // once the total fits.
        if let Some(existing) = self.items.iter_mut().find(|line| line.item.id == item.id) {
            existing.quantity += quantity;
            self.total_price += existing.item.unit_price * quantity;
        } else {
            self.total_price += item.unit_price * quantity;
            self.items.push(CartLine { item, quantity });
        }
        self.total_quantity = total_quantity;
        true
    }

    /// Remove the line for `id`. Unknown ids are a no-op.
    ///
    /// Returns `true` if the cart changed.
    pub fn remove_line(&mut self, id: &CartItemId) -> bool {
        let Some(index) = self.items.iter().position(|line| &line.item.id == id) else {
            return false;
        };
        let removed = self.items.remove(index);
        self.total_quantity -= removed.quantity;
        self.total_price -= removed.line_total();
        true
    }

    /// Set the absolute quantity of the line for `id`.
    ///
    /// Totals move by the difference from the previous quantity. Setting `0`
    /// removes the line. Unknown ids are a no-op, as is a quantity that would
    /// push the total quantity past `u32::MAX`.
    ///
    /// Returns `true` if the cart changed.
    pub fn set_quantity(&mut self, id: &CartItemId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove_line(id);
        }

        let Some(line) = self.items.iter_mut().find(|line| &line.item.id == id) else {
            return false;
        };
        let previous = line.quantity;
        if previous == quantity {
            return false;
        }
        let Some(total_quantity) = (self.total_quantity - previous).checked_add(quantity) else {
            return false;
        };

        line.quantity = quantity;
        let delta = i64::from(quantity) - i64::from(previous);
        self.total_price += line.item.unit_price * delta;
        self.total_quantity = total_quantity;
        true
    }

    /// Remove every line.
    ///
    /// Returns `true` if the cart changed.
    pub fn clear(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        *self = Self::new();
        true
    }
}
