//! # Domain Types
//!
//! Core domain types used throughout Haveli POS.
//!
//! ## Persisted entities
//! - [`Product`] - inventory record; its `current_stock` is the single
//!   contended value in the system and is only ever mutated by relative
//!   deltas in haveli-db.
//! - [`Sale`] / [`SaleItem`] - committed transaction header and lines.
//!   Line prices are frozen at commit time (snapshot pattern): a later
//!   change to `Product.selling_price_paise` never revises a recorded sale.
//! - [`ShopSettings`] - singleton shop profile row read by receipt rendering.
//!
//! ## Dual representation
//! Every entity has a UUID v4 `id` used for database relations; the product
//! `name` is the human-facing identifier the billing screen works with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on the billing screen and receipt.
    pub name: String,

    /// Category label (e.g. "Switches", "Wiring").
    pub category: String,

    /// Purchase cost in paise (for profit reporting).
    pub cost_price_paise: i64,

    /// Selling price in paise.
    pub selling_price_paise: i64,

    /// Current stock level. Never below 0 after any committed operation.
    pub current_stock: i64,

    /// Reorder threshold; at or below this the product is "low stock".
    pub min_stock_level: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the selling price as a Money type.
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_paise(self.selling_price_paise)
    }

    /// Returns the cost price as a Money type.
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_paise(self.cost_price_paise)
    }

    /// Checks whether `quantity` units can be sold from the current snapshot.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.current_stock >= quantity
    }

    /// Checks whether stock has fallen to the reorder threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock_level
    }
}

// =============================================================================
// Payment Mode
// =============================================================================

/// How the customer settled the bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// Physical cash payment.
    Cash,
    /// UPI transfer (scan-to-pay against the shop's UPI id).
    Upi,
    /// Card payment on an external terminal.
    Card,
}

impl PaymentMode {
    /// Parses a user-entered mode string, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "cash" => Some(PaymentMode::Cash),
            "upi" => Some(PaymentMode::Upi),
            "card" | "credit" | "debit" => Some(PaymentMode::Card),
            _ => None,
        }
    }

    /// Label used on receipts.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Upi => "UPI",
            PaymentMode::Card => "Card",
        }
    }
}

impl Default for PaymentMode {
    fn default() -> Self {
        PaymentMode::Cash
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale transaction.
///
/// Created atomically with its [`SaleItem`]s by the commit protocol and
/// immutable afterwards; the only further lifecycle event is the void-delete,
/// which cascades to the items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Customer WhatsApp number, if captured at the billing screen.
    pub customer_phone: Option<String>,
    /// Grand total in paise; equals Σ quantity × price_at_sale over the items.
    pub total_paise: i64,
    pub payment_mode: PaymentMode,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }

    /// Short id shown on receipts and the billing screen (first 8 chars).
    pub fn short_id(&self) -> &str {
        let end = self.id.len().min(8);
        &self.id[..end]
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a committed sale.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Unit price in paise at time of sale (frozen, never revised).
    pub price_at_sale_paise: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn price_at_sale(&self) -> Money {
        Money::from_paise(self.price_at_sale_paise)
    }

    /// Returns the line total (price at sale × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price_at_sale().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Shop Settings
// =============================================================================

/// Shop profile configuration (singleton row, `id = 1`).
///
/// Read by receipt rendering and the WhatsApp message builder; mutated only
/// through the explicit settings update command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ShopSettings {
    pub id: i64,
    pub shop_name: String,
    pub shop_address: String,
    pub shop_contact: String,
    /// UPI id printed on receipts for scan-to-pay.
    pub upi_id: String,
    /// Tax rate in basis points (1800 = 18% GST).
    pub tax_rate_bps: i64,
    pub updated_at: DateTime<Utc>,
}

impl ShopSettings {
    /// Fallback profile used when the settings row is unreachable.
    ///
    /// Receipt and message rendering degrade to this instead of failing;
    /// callers log the degraded read.
    pub fn fallback() -> Self {
        ShopSettings {
            id: SHOP_SETTINGS_ID,
            shop_name: DEFAULT_SHOP_NAME.to_string(),
            shop_address: String::new(),
            shop_contact: String::new(),
            upi_id: String::new(),
            tax_rate_bps: 0,
            updated_at: Utc::now(),
        }
    }
}

/// Fixed primary key of the settings singleton row.
pub const SHOP_SETTINGS_ID: i64 = 1;

/// Shop name used when settings cannot be read.
pub const DEFAULT_SHOP_NAME: &str = "Haveli Electricals";

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_mode_parse() {
        assert_eq!(PaymentMode::parse("Cash"), Some(PaymentMode::Cash));
        assert_eq!(PaymentMode::parse("upi"), Some(PaymentMode::Upi));
        assert_eq!(PaymentMode::parse("CARD"), Some(PaymentMode::Card));
        assert_eq!(PaymentMode::parse("cheque"), None);
    }

    #[test]
    fn test_product_can_sell() {
        let product = Product {
            id: "p1".to_string(),
            name: "Switch".to_string(),
            category: "Switches".to_string(),
            cost_price_paise: 3000,
            selling_price_paise: 5000,
            current_stock: 5,
            min_stock_level: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(product.can_sell(5));
        assert!(!product.can_sell(6));
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_sale_item_line_total() {
        let item = SaleItem {
            id: "i1".to_string(),
            sale_id: "s1".to_string(),
            product_id: "p1".to_string(),
            name_snapshot: "Switch".to_string(),
            quantity: 3,
            price_at_sale_paise: 5000,
            created_at: Utc::now(),
        };
        assert_eq!(item.line_total().paise(), 15000);
    }

    #[test]
    fn test_sale_short_id() {
        let sale = Sale {
            id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            customer_phone: None,
            total_paise: 0,
            payment_mode: PaymentMode::Cash,
            created_at: Utc::now(),
        };
        assert_eq!(sale.short_id(), "550e8400");
    }
}
