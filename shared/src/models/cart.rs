//! Cart Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest quantity a single cart line may hold
pub const MAX_LINE_QUANTITY: u32 = 999;

/// A line subtotal or cart total left the representable range
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Cart amount out of range")]
pub struct AmountOverflow;

fn line_subtotal(price: Decimal, quantity: u32) -> Result<Decimal, AmountOverflow> {
    price
        .checked_mul(Decimal::from(quantity))
        .ok_or(AmountOverflow)
}

/// A live cart line. Name, price and image are copied from the menu item
/// when the line is first added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartEntry {
    pub menu_item_id: String,
    /// Vendor owning the menu item at add time
    pub vendor_id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    pub quantity: u32,
    /// Always `price * quantity`
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

impl CartEntry {
    /// Leaves the line untouched on overflow
    pub fn set_quantity(&mut self, quantity: u32) -> Result<(), AmountOverflow> {
        self.subtotal = line_subtotal(self.price, quantity)?;
        self.quantity = quantity;
        Ok(())
    }
}

/// One cart per user. Emptied (not deleted) after an order is placed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub user_id: String,
    pub items: Vec<CartEntry>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub updated_at: i64,
}

impl Cart {
    pub fn empty(user_id: impl Into<String>, now: i64) -> Self {
        Self {
            user_id: user_id.into(),
            items: Vec::new(),
            total_amount: Decimal::ZERO,
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn entry_mut(&mut self, menu_item_id: &str) -> Option<&mut CartEntry> {
        self.items
            .iter_mut()
            .find(|e| e.menu_item_id == menu_item_id)
    }

    /// Drop every line; the cart itself stays
    pub fn clear(&mut self, now: i64) {
        self.items.clear();
        self.total_amount = Decimal::ZERO;
        self.updated_at = now;
    }

    /// Recompute every subtotal and the cart total, stamping `updated_at`.
    pub fn recalculate(&mut self, now: i64) -> Result<(), AmountOverflow> {
        let mut total = Decimal::ZERO;
        for entry in &mut self.items {
            entry.subtotal = line_subtotal(entry.price, entry.quantity)?;
            total = total.checked_add(entry.subtotal).ok_or(AmountOverflow)?;
        }
        self.total_amount = total;
        self.updated_at = now;
        Ok(())
    }
}
