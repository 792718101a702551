//! # Sale Repository
//!
//! The commit and void protocols, plus sale lookups.
//!
//! ## Commit Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       commit_sale()                                     │
//! │                                                                         │
//! │  BEGIN TRANSACTION                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  For each line:                                                        │
//! │    UPDATE products SET current_stock = current_stock - qty             │
//! │    WHERE id = ? AND current_stock >= qty      ← guard + write, atomic │
//! │       │                                                                 │
//! │       ├── rows_affected == 0 → ROLLBACK (StockConflict / NotFound)     │
//! │       ▼                                                                 │
//! │  INSERT sales header  (total = Σ line totals, computed here)           │
//! │  INSERT sale_items    (name + price frozen per line)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT - all effects appear together or not at all                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart's add-time stock check is a courtesy against a snapshot; this
//! protocol is the authoritative check against live rows.
//!
//! ## Void Protocol
//! Compensating inverse of commit: restore each item's quantity to its
//! product (additive, no guard needed), then delete the header. The FK
//! cascade removes the items. Restock done after an intervening manual
//! stock edit can overshoot the original level; that drift is accepted.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use haveli_core::{CartLine, PaymentMode, Sale, SaleItem};

/// Column list for sale SELECTs, matching [`Sale`] field names.
const SALE_COLUMNS: &str = "id, customer_phone, total_paise, payment_mode, created_at";

/// Column list for sale item SELECTs, matching [`SaleItem`] field names.
const SALE_ITEM_COLUMNS: &str =
    "id, sale_id, product_id, name_snapshot, quantity, price_at_sale_paise, created_at";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Commit Protocol
    // =========================================================================

    /// Commits a cart as a finalized sale.
    ///
    /// Runs the whole protocol in one transaction: guarded stock decrement
    /// per line, then the sale header and frozen item rows. The stored total
    /// is computed here from the lines, so header and items can never
    /// disagree.
    ///
    /// ## Errors
    /// * `DbError::InvalidDraft` - Empty line list, or a line with a
    ///   non-positive quantity or negative price
    /// * `DbError::NotFound` - A line references a deleted product
    /// * `DbError::StockConflict` - Live stock fell below a line's quantity
    ///   since the cart was built; nothing was written
    pub async fn commit_sale(
        &self,
        customer_phone: Option<&str>,
        payment_mode: PaymentMode,
        lines: &[CartLine],
    ) -> DbResult<Sale> {
        if lines.is_empty() {
            return Err(DbError::InvalidDraft("sale has no lines".to_string()));
        }

        // Reject malformed lines before touching the database; the schema
        // CHECKs are the backstop, not the reporting path.
        for line in lines {
            if line.quantity < 1 {
                return Err(DbError::InvalidDraft(format!(
                    "line '{}' has invalid quantity {}",
                    line.name, line.quantity
                )));
            }
            if line.unit_price_paise < 0 {
                return Err(DbError::InvalidDraft(format!(
                    "line '{}' has negative price {}",
                    line.name, line.unit_price_paise
                )));
            }
        }

        let sale_id = generate_sale_id();
        let now = Utc::now();
        let total_paise: i64 = lines.iter().map(|l| l.line_total().paise()).sum();

        debug!(
            sale_id = %sale_id,
            lines = lines.len(),
            total_paise = total_paise,
            "Committing sale"
        );

        let mut tx = self.pool.begin().await?;

        // Guarded decrement per line. A failed guard aborts the whole sale.
        for line in lines {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET current_stock = current_stock - ?2,
                    updated_at = ?3
                WHERE id = ?1 AND current_stock >= ?2
                "#,
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Guard failed: distinguish a vanished product from a
                // stale-cart conflict by re-reading inside the transaction.
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT current_stock FROM products WHERE id = ?1")
                        .bind(&line.product_id)
                        .fetch_optional(&mut *tx)
                        .await?;

                tx.rollback().await?;

                return match available {
                    Some(stock) => {
                        warn!(
                            product = %line.name,
                            available = stock,
                            requested = line.quantity,
                            "Stock conflict at commit; sale rolled back"
                        );
                        Err(DbError::stock_conflict(
                            line.name.clone(),
                            stock,
                            line.quantity,
                        ))
                    }
                    None => Err(DbError::not_found("Product", &line.product_id)),
                };
            }
        }

        let phone = customer_phone
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let sale = Sale {
            id: sale_id.clone(),
            customer_phone: phone,
            total_paise,
            payment_mode,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (id, customer_phone, total_paise, payment_mode, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.customer_phone)
        .bind(sale.total_paise)
        .bind(sale.payment_mode)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id,
                    name_snapshot, quantity, price_at_sale_paise,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(generate_sale_item_id())
            .bind(&sale.id)
            .bind(&line.product_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.unit_price_paise)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            total_paise = sale.total_paise,
            "Sale committed"
        );

        Ok(sale)
    }

    // =========================================================================
    // Void Protocol
    // =========================================================================

    /// Voids a finalized sale, restoring its stock.
    ///
    /// One transaction: read the items, add each quantity back to its
    /// product, delete the header (items cascade). Voiding an unknown or
    /// already-voided sale returns `NotFound` with no effects; the caller
    /// must not retry.
    pub async fn void_sale(&self, sale_id: &str) -> DbResult<()> {
        debug!(sale_id = %sale_id, "Voiding sale");

        let mut tx = self.pool.begin().await?;

        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {SALE_ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1"
        ))
        .bind(sale_id)
        .fetch_all(&mut *tx)
        .await?;

        let now = Utc::now();

        // Additive restore. The product may have been deleted or restocked
        // since the sale; a missing row is skipped rather than failing the
        // void (the units have nowhere to go back to).
        for item in &items {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET current_stock = current_stock + ?2,
                    updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                warn!(
                    sale_id = %sale_id,
                    product_id = %item.product_id,
                    "Voided item's product no longer exists; stock not restored"
                );
            }
        }

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::not_found("Sale", sale_id));
        }

        tx.commit().await?;

        info!(sale_id = %sale_id, items = items.len(), "Sale voided");
        Ok(())
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all items for a sale, in insertion order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {SALE_ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY rowid"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists recent sales, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY created_at DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Counts finalized sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new sale item ID.
pub fn generate_sale_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
