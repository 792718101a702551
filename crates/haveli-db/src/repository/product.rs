//! # Product Repository
//!
//! Database operations for the product catalogue and its stock levels.
//!
//! ## Stock Mutation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: Absolute update (clobbers concurrent sales)                 │
//! │     UPDATE products SET current_stock = 7 WHERE id = ?                 │
//! │                                                                         │
//! │  ✅ CORRECT: Guarded relative delta                                    │
//! │     UPDATE products                                                    │
//! │     SET current_stock = current_stock - 3                              │
//! │     WHERE id = ? AND current_stock >= 3                                │
//! │                                                                         │
//! │  rows_affected == 0 means the guard failed: either the product is     │
//! │  gone or someone sold the same units first. The caller decides which  │
//! │  by re-reading the row.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use haveli_core::Product;

/// Column list shared by every product SELECT. Field names on
/// [`Product`] match these exactly, so `query_as` maps rows directly.
const PRODUCT_COLUMNS: &str = "id, name, category, cost_price_paise, selling_price_paise, \
     current_stock, min_stock_level, created_at, updated_at";

/// A new product before it gets an ID and timestamps.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub cost_price_paise: i64,
    pub selling_price_paise: i64,
    pub current_stock: i64,
    pub min_stock_level: i64,
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // Sellable catalogue for the billing screen
/// let products = repo.list_in_stock().await?;
///
/// // Get by ID
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product, generating its ID and timestamps.
    pub async fn insert(&self, new: NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            name: new.name,
            category: new.category,
            cost_price_paise: new.cost_price_paise,
            selling_price_paise: new.selling_price_paise,
            current_stock: new.current_stock,
            min_stock_level: new.min_stock_level,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category,
                cost_price_paise, selling_price_paise,
                current_stock, min_stock_level,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.cost_price_paise)
        .bind(product.selling_price_paise)
        .bind(product.current_stock)
        .bind(product.min_stock_level)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Bulk-inserts products in a single transaction.
    ///
    /// All-or-nothing: a constraint failure on any row rolls back the whole
    /// batch, so a half-imported catalogue never appears.
    ///
    /// ## Returns
    /// The inserted products with generated IDs, in input order.
    pub async fn bulk_insert(&self, rows: Vec<NewProduct>) -> DbResult<Vec<Product>> {
        debug!(count = rows.len(), "Bulk-inserting products");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(rows.len());

        for new in rows {
            let product = Product {
                id: generate_product_id(),
                name: new.name,
                category: new.category,
                cost_price_paise: new.cost_price_paise,
                selling_price_paise: new.selling_price_paise,
                current_stock: new.current_stock,
                min_stock_level: new.min_stock_level,
                created_at: now,
                updated_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO products (
                    id, name, category,
                    cost_price_paise, selling_price_paise,
                    current_stock, min_stock_level,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&product.id)
            .bind(&product.name)
            .bind(&product.category)
            .bind(product.cost_price_paise)
            .bind(product.selling_price_paise)
            .bind(product.current_stock)
            .bind(product.min_stock_level)
            .bind(product.created_at)
            .bind(product.updated_at)
            .execute(&mut *tx)
            .await?;

            inserted.push(product);
        }

        tx.commit().await?;

        debug!(count = inserted.len(), "Bulk insert committed");
        Ok(inserted)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its exact name.
    ///
    /// Names are not unique by schema; if duplicates exist the first by
    /// insertion order wins. The billing screen keys its lines by name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE name = ?1 LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists the whole catalogue, sorted by name.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists products with stock on hand (the sellable catalogue).
    ///
    /// The billing screen only offers these; a product at zero stock cannot
    /// even enter a cart.
    pub async fn list_in_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE current_stock > 0 ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed in-stock products");
        Ok(products)
    }

    /// Searches the catalogue by name fragment, case-insensitive.
    pub async fn search(&self, fragment: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE name LIKE '%' || ?1 || '%' COLLATE NOCASE ORDER BY name"
        ))
        .bind(fragment)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists products at or below the given stock threshold.
    ///
    /// Drives the reorder alert on the billing screen (threshold 3 there)
    /// and the low-stock report in inventory.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE current_stock <= ?1 ORDER BY current_stock, name"
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Updates an existing product's editable fields.
    ///
    /// Stock is deliberately excluded: stock only moves through
    /// [`adjust_stock`](Self::adjust_stock) and the sale protocols.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                cost_price_paise = ?4,
                selling_price_paise = ?5,
                min_stock_level = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.cost_price_paise)
        .bind(product.selling_price_paise)
        .bind(product.min_stock_level)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Applies a relative stock delta with a non-negative guard.
    ///
    /// Negative deltas (sales) only apply when enough stock remains; the
    /// guard and the update are one atomic statement. Positive deltas
    /// (restock, void restore) always apply.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::StockConflict)` - Guard failed: not enough stock
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET current_stock = current_stock + ?2,
                updated_at = ?3
            WHERE id = ?1 AND current_stock + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish a missing row from a failed guard.
            return match self.get_by_id(id).await? {
                Some(p) => Err(DbError::stock_conflict(p.name, p.current_stock, -delta)),
                None => Err(DbError::not_found("Product", id)),
            };
        }

        Ok(())
    }

    /// Deletes a product outright.
    ///
    /// Fails with a foreign key violation if any sale item references it;
    /// history wins over tidiness.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products in the catalogue (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn switch(stock: i64) -> NewProduct {
        NewProduct {
            name: "Modular Switch".to_string(),
            category: "Switches".to_string(),
            cost_price_paise: 3000,
            selling_price_paise: 5000,
            current_stock: stock,
            min_stock_level: 2,
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = db().await;
        let repo = db.products();

        let p = repo.insert(switch(5)).await.unwrap();
        let fetched = repo.get_by_id(&p.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Modular Switch");
        assert_eq!(fetched.current_stock, 5);
        assert_eq!(fetched.selling_price_paise, 5000);
    }

    #[tokio::test]
    async fn test_list_in_stock_hides_zero_stock() {
        let db = db().await;
        let repo = db.products();

        repo.insert(switch(5)).await.unwrap();
        repo.insert(NewProduct {
            name: "Ceiling Fan".to_string(),
            current_stock: 0,
            ..switch(0)
        })
        .await
        .unwrap();

        let sellable = repo.list_in_stock().await.unwrap();
        assert_eq!(sellable.len(), 1);
        assert_eq!(sellable[0].name, "Modular Switch");

        // list_all still shows both
        assert_eq!(repo.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_adjust_stock_guard() {
        let db = db().await;
        let repo = db.products();

        let p = repo.insert(switch(5)).await.unwrap();

        // Deduct within stock: ok
        repo.adjust_stock(&p.id, -3).await.unwrap();
        assert_eq!(
            repo.get_by_id(&p.id).await.unwrap().unwrap().current_stock,
            2
        );

        // Deduct past zero: guard fires, stock untouched
        let err = repo.adjust_stock(&p.id, -3).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::StockConflict {
                available: 2,
                requested: 3,
                ..
            }
        ));
        assert_eq!(
            repo.get_by_id(&p.id).await.unwrap().unwrap().current_stock,
            2
        );

        // Restock is always allowed
        repo.adjust_stock(&p.id, 10).await.unwrap();
        assert_eq!(
            repo.get_by_id(&p.id).await.unwrap().unwrap().current_stock,
            12
        );
    }

    #[tokio::test]
    async fn test_adjust_stock_missing_product() {
        let db = db().await;
        let err = db.products().adjust_stock("no-such-id", -1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_bulk_insert_all_or_nothing() {
        let db = db().await;
        let repo = db.products();

        let rows = vec![
            switch(5),
            NewProduct {
                name: "LED Bulb 9W".to_string(),
                ..switch(20)
            },
            NewProduct {
                name: "Extension Board".to_string(),
                ..switch(8)
            },
        ];

        let inserted = repo.bulk_insert(rows).await.unwrap();
        assert_eq!(inserted.len(), 3);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_search_matches_fragment_case_insensitive() {
        let db = db().await;
        let repo = db.products();

        repo.insert(switch(5)).await.unwrap();
        repo.insert(NewProduct {
            name: "LED Bulb 9W".to_string(),
            ..switch(20)
        })
        .await
        .unwrap();

        let hits = repo.search("switch").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Modular Switch");

        assert!(repo.search("heater").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_low_stock() {
        let db = db().await;
        let repo = db.products();

        repo.insert(switch(1)).await.unwrap();
        repo.insert(NewProduct {
            name: "LED Bulb 9W".to_string(),
            ..switch(50)
        })
        .await
        .unwrap();

        let low = repo.low_stock(3).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Modular Switch");
    }

    #[tokio::test]
    async fn test_update_does_not_touch_stock() {
        let db = db().await;
        let repo = db.products();

        let mut p = repo.insert(switch(5)).await.unwrap();
        p.name = "Modular Switch 6A".to_string();
        p.selling_price_paise = 5500;
        p.current_stock = 999; // must be ignored

        repo.update(&p).await.unwrap();

        let fetched = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Modular Switch 6A");
        assert_eq!(fetched.selling_price_paise, 5500);
        assert_eq!(fetched.current_stock, 5);
    }
}
