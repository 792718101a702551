//! # Cart
//!
//! The working set of line items for the bill currently being assembled.
//!
//! The cart is ephemeral, session-scoped state: it never touches persisted
//! storage. Stock checks here run against the product snapshot the caller
//! fetched; the commit protocol in haveli-db re-validates against live stock
//! because this snapshot can be stale by the time the bill is finalized.
//!
//! ## Invariants
//! - Lines are unique by `product_id`: adding a product already in the cart
//!   increases that line's quantity instead of duplicating it.
//! - An add that would exceed the stock snapshot fails and leaves the cart
//!   unchanged.
//! - Quantity is always ≥ 1 and unit price ≥ 0 (enforced on add and edit).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::validation::{validate_price_paise, validate_quantity};
use crate::MAX_CART_ITEMS;

// =============================================================================
// Cart Line
// =============================================================================

/// A line item on the pending bill.
///
/// Price and cost are frozen copies of the product at the moment of adding;
/// they do not follow later catalog price changes. The price can still be
/// overridden by an explicit line edit before the bill is finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Product ID (UUID), for the commit protocol and stock mutation.
    pub product_id: String,

    /// Product name at time of adding (frozen), the key the billing grid
    /// edits lines by.
    pub name: String,

    /// Quantity on the bill.
    pub quantity: i64,

    /// Unit selling price in paise at time of adding; editable pre-commit.
    pub unit_price_paise: i64,

    /// Unit cost in paise at time of adding (for profit accounting).
    pub unit_cost_paise: i64,

    /// When this line was added.
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a line from a product snapshot and quantity.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity,
            unit_price_paise: product.selling_price_paise,
            unit_cost_paise: product.cost_price_paise,
            added_at: Utc::now(),
        }
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_paise(self.unit_price_paise).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The bill being assembled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    /// Lines in add order.
    pub lines: Vec<CartLine>,

    /// When the cart was created/last cleared.
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a product to the cart, or increases the existing line's quantity.
    ///
    /// Fails with [`CoreError::InsufficientStock`] if the requested quantity
    /// (combined with any existing line for the same product) exceeds the
    /// product's stock snapshot. On failure the cart is left unchanged.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product.id)
        {
            let combined = line.quantity + quantity;
            if combined > product.current_stock {
                return Err(CoreError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.current_stock,
                    requested: combined,
                });
            }
            line.quantity = combined;
            return Ok(());
        }

        if quantity > product.current_stock {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available: product.current_stock,
                requested: quantity,
            });
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Overrides quantity and unit price on a pending line, keyed by product
    /// name (the billing grid edits rows by name).
    ///
    /// No stock re-check happens here; the commit protocol re-validates every
    /// line against live stock.
    pub fn edit_line(&mut self, name: &str, quantity: i64, unit_price_paise: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;
        validate_price_paise(unit_price_paise)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.name == name)
            .ok_or_else(|| CoreError::LineNotFound {
                name: name.to_string(),
            })?;

        line.quantity = quantity;
        line.unit_price_paise = unit_price_paise;
        Ok(())
    }

    /// Removes a line by product ID.
    pub fn remove_line(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);

        if self.lines.len() == before {
            return Err(CoreError::ProductNotFound(product_id.to_string()));
        }
        Ok(())
    }

    /// Grand total: Σ quantity × unit price over all lines. Pure.
    pub fn total(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.line_total())
    }

    /// Discards all lines. Used for "new bill" and post-void reset.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total unit quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(id: &str, price_paise: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            category: "Test".to_string(),
            cost_price_paise: price_paise / 2,
            selling_price_paise: price_paise,
            current_stock: stock,
            min_stock_level: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_item() {
        let mut cart = Cart::new();
        let product = test_product("1", 5000, 10);

        cart.add_item(&product, 2).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.total().paise(), 10000);
    }

    #[test]
    fn test_add_same_product_merges_line() {
        let mut cart = Cart::new();
        let product = test_product("1", 5000, 10);

        cart.add_item(&product, 2).unwrap();
        cart.add_item(&product, 3).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].quantity, 5);
    }

    #[test]
    fn test_add_exceeding_stock_fails() {
        let mut cart = Cart::new();
        let product = test_product("1", 5000, 2);

        let err = cart.add_item(&product, 3).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            }
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_merge_exceeding_stock_fails_and_cart_unchanged() {
        let mut cart = Cart::new();
        let product = test_product("1", 5000, 5);

        cart.add_item(&product, 3).unwrap();
        // 3 + 3 > 5: rejected, existing line keeps quantity 3
        let err = cart.add_item(&product, 3).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            }
        ));
        assert_eq!(cart.lines[0].quantity, 3);
    }

    #[test]
    fn test_merge_exactly_at_stock_succeeds() {
        let mut cart = Cart::new();
        let product = test_product("1", 5000, 5);

        cart.add_item(&product, 3).unwrap();
        cart.add_item(&product, 2).unwrap();
        assert_eq!(cart.lines[0].quantity, 5);
    }

    #[test]
    fn test_price_snapshot_frozen_at_add_time() {
        let mut cart = Cart::new();
        let mut product = test_product("1", 5000, 10);

        cart.add_item(&product, 1).unwrap();
        product.selling_price_paise = 9000; // catalog price change after add

        assert_eq!(cart.lines[0].unit_price_paise, 5000);
    }

    #[test]
    fn test_edit_line() {
        let mut cart = Cart::new();
        let product = test_product("1", 5000, 10);
        cart.add_item(&product, 2).unwrap();

        cart.edit_line("Product 1", 4, 4500).unwrap();

        assert_eq!(cart.lines[0].quantity, 4);
        assert_eq!(cart.lines[0].unit_price_paise, 4500);
        assert_eq!(cart.total().paise(), 18000);
    }

    #[test]
    fn test_edit_line_rejects_invalid_values() {
        let mut cart = Cart::new();
        let product = test_product("1", 5000, 10);
        cart.add_item(&product, 2).unwrap();

        assert!(cart.edit_line("Product 1", 0, 4500).is_err());
        assert!(cart.edit_line("Product 1", 2, -1).is_err());
        assert!(cart.edit_line("Unknown", 2, 4500).is_err());
        // rejected edits leave the line untouched
        assert_eq!(cart.lines[0].quantity, 2);
        assert_eq!(cart.lines[0].unit_price_paise, 5000);
    }

    #[test]
    fn test_remove_line() {
        let mut cart = Cart::new();
        let product = test_product("1", 5000, 10);
        cart.add_item(&product, 2).unwrap();

        cart.remove_line("1").unwrap();
        assert!(cart.is_empty());
        assert!(cart.remove_line("1").is_err());
    }

    #[test]
    fn test_cart_caps_distinct_lines() {
        let mut cart = Cart::new();

        for i in 0..crate::MAX_CART_ITEMS {
            let product = test_product(&i.to_string(), 5000, 10);
            cart.add_item(&product, 1).unwrap();
        }

        let overflow = test_product("overflow", 5000, 10);
        let err = cart.add_item(&overflow, 1).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));
        assert_eq!(cart.line_count(), crate::MAX_CART_ITEMS);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        let product = test_product("1", 5000, 10);
        cart.add_item(&product, 2).unwrap();

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());
    }
}
