//! Cart Aggregate
//!
//! The storefront keeps the cart on the client; at checkout the submitted
//! lines are folded into a `Cart` so duplicates merge and the subtotal is
//! computed from server-side prices.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::DbId;

/// A requested line before prices are known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: DbId,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CartItem {
    pub product_id: DbId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal { self.unit_price * Decimal::from(self.quantity) }
}

#[derive(Clone, Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    items: Vec<CartItem>,
    subtotal: Decimal,
}

impl Cart {
    /// Fold requested lines, merging repeated product ids and dropping zero
    /// quantities. Line order follows first appearance.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Result<Self, CartError> {
        let mut merged: Vec<CartLine> = Vec::new();
        for line in lines {
            if line.quantity == 0 { continue; }
            if let Some(existing) = merged.iter_mut().find(|l| l.product_id == line.product_id) {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            } else {
                merged.push(line);
            }
        }
        if merged.is_empty() { return Err(CartError::Empty); }
        Ok(Self { lines: merged, items: vec![], subtotal: Decimal::ZERO })
    }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn subtotal(&self) -> Decimal { self.subtotal }
    pub fn product_ids(&self) -> Vec<DbId> { self.lines.iter().map(|l| l.product_id).collect() }

    /// Attach the snapshotted price for a line. Fails for ids not in the cart.
    pub fn price_line(&mut self, product_id: DbId, name: impl Into<String>, unit_price: Decimal) -> Result<(), CartError> {
        let line = self.lines.iter().find(|l| l.product_id == product_id).ok_or(CartError::ItemNotFound(product_id))?;
        let item = CartItem { product_id, name: name.into(), quantity: line.quantity, unit_price };
        self.items.retain(|i| i.product_id != product_id);
        self.items.push(item);
        self.recalculate();
        Ok(())
    }

    /// True once every requested line carries a price.
    pub fn is_fully_priced(&self) -> bool { self.items.len() == self.lines.len() }

    fn recalculate(&mut self) {
        self.subtotal = self.items.iter().map(CartItem::line_total).sum();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Cart is empty")]
    Empty,
    #[error("Product {0} is not in the cart")]
    ItemNotFound(DbId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cart_merges_duplicate_lines() {
        let cart = Cart::from_lines([
            CartLine { product_id: 1, quantity: 2 },
            CartLine { product_id: 2, quantity: 1 },
            CartLine { product_id: 1, quantity: 1 },
        ]).unwrap();
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0], CartLine { product_id: 1, quantity: 3 });
        assert_eq!(cart.product_ids(), vec![1, 2]);
    }

    #[test]
    fn test_cart_rejects_empty() {
        assert_eq!(Cart::from_lines([]).unwrap_err(), CartError::Empty);
        assert_eq!(Cart::from_lines([CartLine { product_id: 4, quantity: 0 }]).unwrap_err(), CartError::Empty);
    }

    #[test]
    fn test_cart_subtotal() {
        let mut cart = Cart::from_lines([CartLine { product_id: 1, quantity: 3 }, CartLine { product_id: 2, quantity: 1 }]).unwrap();
        cart.price_line(1, "Widget", dec!(9.50)).unwrap();
        assert!(!cart.is_fully_priced());
        cart.price_line(2, "Gadget", dec!(100.00)).unwrap();
        assert!(cart.is_fully_priced());
        assert_eq!(cart.subtotal(), dec!(128.50));
        assert_eq!(cart.price_line(9, "Ghost", dec!(1)), Err(CartError::ItemNotFound(9)));
    }
}
