//! # Insights Repository
//!
//! Read-only analytics over finalized sales.
//!
//! Voided sales leave no rows behind, so every aggregate here is over
//! live revenue only. Profit joins each item's frozen sale price against
//! the product's *current* cost price; items whose product was deleted
//! contribute zero cost (revenue counts, profit is overstated for them).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

// =============================================================================
// Row Types
// =============================================================================

/// Totals across all sales in the window.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalesSummary {
    /// Number of finalized sales.
    pub sale_count: i64,
    /// Total units sold across all items.
    pub units_sold: i64,
    /// Σ quantity × price_at_sale.
    pub revenue_paise: i64,
    /// Σ quantity × (price_at_sale − current cost price).
    pub profit_paise: i64,
}

/// One calendar day's aggregate.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailySales {
    /// Day in `YYYY-MM-DD` (UTC).
    pub day: String,
    pub sale_count: i64,
    pub revenue_paise: i64,
    pub profit_paise: i64,
}

/// Per-product performance, ranked by revenue.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductPerformance {
    /// Name as sold (the item snapshot, so deleted products still report).
    pub name: String,
    pub units_sold: i64,
    pub revenue_paise: i64,
    pub profit_paise: i64,
}

/// Revenue split by payment mode.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentBreakdown {
    pub payment_mode: String,
    pub sale_count: i64,
    pub revenue_paise: i64,
}

/// One sold line with its revenue, cost and profit.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProfitRow {
    pub sale_id: String,
    /// Sale timestamp, ISO string as stored.
    pub sold_at: String,
    /// Name as sold (the item snapshot).
    pub name: String,
    pub quantity: i64,
    pub revenue_paise: i64,
    /// quantity × current cost price; zero when the product is gone.
    pub cost_paise: i64,
    pub profit_paise: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sales analytics queries.
#[derive(Debug, Clone)]
pub struct InsightsRepository {
    pool: SqlitePool,
}

impl InsightsRepository {
    /// Creates a new InsightsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InsightsRepository { pool }
    }

    /// Overall totals across finalized sales, optionally bounded below.
    pub async fn summary(&self, since: Option<DateTime<Utc>>) -> DbResult<SalesSummary> {
        debug!(?since, "Computing sales summary");

        let summary = sqlx::query_as::<_, SalesSummary>(
            r#"
            SELECT
                COUNT(DISTINCT si.sale_id)                               AS sale_count,
                COALESCE(SUM(si.quantity), 0)                            AS units_sold,
                COALESCE(SUM(si.quantity * si.price_at_sale_paise), 0)   AS revenue_paise,
                COALESCE(SUM(si.quantity *
                    (si.price_at_sale_paise - COALESCE(p.cost_price_paise, 0))), 0)
                                                                         AS profit_paise
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            LEFT JOIN products p ON p.id = si.product_id
            WHERE ?1 IS NULL OR s.created_at >= ?1
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    /// Per-line revenue, cost and profit, optionally bounded below.
    ///
    /// The raw rows behind the profit report; callers aggregate or export.
    pub async fn profit_rows(&self, since: Option<DateTime<Utc>>) -> DbResult<Vec<ProfitRow>> {
        let rows = sqlx::query_as::<_, ProfitRow>(
            r#"
            SELECT
                si.sale_id                                               AS sale_id,
                s.created_at                                             AS sold_at,
                si.name_snapshot                                         AS name,
                si.quantity                                              AS quantity,
                si.quantity * si.price_at_sale_paise                     AS revenue_paise,
                si.quantity * COALESCE(p.cost_price_paise, 0)            AS cost_paise,
                si.quantity *
                    (si.price_at_sale_paise - COALESCE(p.cost_price_paise, 0))
                                                                         AS profit_paise
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            LEFT JOIN products p ON p.id = si.product_id
            WHERE ?1 IS NULL OR s.created_at >= ?1
            ORDER BY s.created_at, si.rowid
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Day-by-day revenue and profit, oldest first.
    pub async fn daily_sales(&self, limit: u32) -> DbResult<Vec<DailySales>> {
        let rows = sqlx::query_as::<_, DailySales>(
            r#"
            SELECT
                date(s.created_at)                                       AS day,
                COUNT(DISTINCT s.id)                                     AS sale_count,
                COALESCE(SUM(si.quantity * si.price_at_sale_paise), 0)   AS revenue_paise,
                COALESCE(SUM(si.quantity *
                    (si.price_at_sale_paise - COALESCE(p.cost_price_paise, 0))), 0)
                                                                         AS profit_paise
            FROM sales s
            JOIN sale_items si ON si.sale_id = s.id
            LEFT JOIN products p ON p.id = si.product_id
            GROUP BY date(s.created_at)
            ORDER BY day DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        // Newest-first from SQL (for the LIMIT), oldest-first for charts.
        let mut rows = rows;
        rows.reverse();
        Ok(rows)
    }

    /// Best-selling products by revenue.
    pub async fn top_products(&self, limit: u32) -> DbResult<Vec<ProductPerformance>> {
        let rows = sqlx::query_as::<_, ProductPerformance>(
            r#"
            SELECT
                si.name_snapshot                                         AS name,
                COALESCE(SUM(si.quantity), 0)                            AS units_sold,
                COALESCE(SUM(si.quantity * si.price_at_sale_paise), 0)   AS revenue_paise,
                COALESCE(SUM(si.quantity *
                    (si.price_at_sale_paise - COALESCE(p.cost_price_paise, 0))), 0)
                                                                         AS profit_paise
            FROM sale_items si
            LEFT JOIN products p ON p.id = si.product_id
            GROUP BY si.name_snapshot
            ORDER BY revenue_paise DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Revenue split by payment mode.
    pub async fn payment_breakdown(&self) -> DbResult<Vec<PaymentBreakdown>> {
        let rows = sqlx::query_as::<_, PaymentBreakdown>(
            r#"
            SELECT
                payment_mode,
                COUNT(*)                     AS sale_count,
                COALESCE(SUM(total_paise), 0) AS revenue_paise
            FROM sales
            GROUP BY payment_mode
            ORDER BY revenue_paise DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::NewProduct;
    use haveli_core::{Cart, PaymentMode};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_and_sell(db: &Database) {
        let switch = db
            .products()
            .insert(NewProduct {
                name: "Switch".to_string(),
                category: "Switches".to_string(),
                cost_price_paise: 3000,
                selling_price_paise: 5000,
                current_stock: 50,
                min_stock_level: 2,
            })
            .await
            .unwrap();
        let bulb = db
            .products()
            .insert(NewProduct {
                name: "Bulb".to_string(),
                category: "Lighting".to_string(),
                cost_price_paise: 1000,
                selling_price_paise: 2000,
                current_stock: 50,
                min_stock_level: 2,
            })
            .await
            .unwrap();

        // Sale 1: 2x Switch (cash)
        let mut cart = Cart::new();
        cart.add_item(&switch, 2).unwrap();
        db.sales()
            .commit_sale(None, PaymentMode::Cash, &cart.lines)
            .await
            .unwrap();

        // Sale 2: 3x Bulb (upi)
        let mut cart = Cart::new();
        cart.add_item(&bulb, 3).unwrap();
        db.sales()
            .commit_sale(None, PaymentMode::Upi, &cart.lines)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_summary() {
        let db = db().await;
        seed_and_sell(&db).await;

        let summary = db.insights().summary(None).await.unwrap();

        assert_eq!(summary.sale_count, 2);
        assert_eq!(summary.units_sold, 5);
        // 2x50.00 + 3x20.00 = 160.00
        assert_eq!(summary.revenue_paise, 16000);
        // 2x(50-30) + 3x(20-10) = 70.00
        assert_eq!(summary.profit_paise, 7000);
    }

    #[tokio::test]
    async fn test_summary_empty_database_is_zero() {
        let db = db().await;
        let summary = db.insights().summary(None).await.unwrap();

        assert_eq!(summary.sale_count, 0);
        assert_eq!(summary.revenue_paise, 0);
        assert_eq!(summary.profit_paise, 0);
    }

    #[tokio::test]
    async fn test_summary_since_bound_excludes_older_sales() {
        let db = db().await;
        seed_and_sell(&db).await;

        // A bound in the future sees nothing; an old bound sees everything.
        let future = chrono::Utc::now() + chrono::Duration::hours(1);
        let summary = db.insights().summary(Some(future)).await.unwrap();
        assert_eq!(summary.sale_count, 0);
        assert_eq!(summary.revenue_paise, 0);

        let past = chrono::Utc::now() - chrono::Duration::hours(1);
        let summary = db.insights().summary(Some(past)).await.unwrap();
        assert_eq!(summary.sale_count, 2);
        assert_eq!(summary.revenue_paise, 16000);
    }

    #[tokio::test]
    async fn test_profit_rows_per_line() {
        let db = db().await;
        seed_and_sell(&db).await;

        let rows = db.insights().profit_rows(None).await.unwrap();

        assert_eq!(rows.len(), 2);
        let switch = rows.iter().find(|r| r.name == "Switch").unwrap();
        assert_eq!(switch.quantity, 2);
        assert_eq!(switch.revenue_paise, 10000);
        assert_eq!(switch.cost_paise, 6000);
        assert_eq!(switch.profit_paise, 4000);
    }

    #[tokio::test]
    async fn test_top_products_ranked_by_revenue() {
        let db = db().await;
        seed_and_sell(&db).await;

        let top = db.insights().top_products(10).await.unwrap();

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Switch");
        assert_eq!(top[0].revenue_paise, 10000);
        assert_eq!(top[1].name, "Bulb");
        assert_eq!(top[1].revenue_paise, 6000);
    }

    #[tokio::test]
    async fn test_payment_breakdown() {
        let db = db().await;
        seed_and_sell(&db).await;

        let breakdown = db.insights().payment_breakdown().await.unwrap();

        assert_eq!(breakdown.len(), 2);
        let cash = breakdown
            .iter()
            .find(|b| b.payment_mode == "cash")
            .unwrap();
        assert_eq!(cash.revenue_paise, 10000);
    }

    #[tokio::test]
    async fn test_void_removes_sale_from_insights() {
        let db = db().await;
        let switch = db
            .products()
            .insert(NewProduct {
                name: "Switch".to_string(),
                category: "Switches".to_string(),
                cost_price_paise: 3000,
                selling_price_paise: 5000,
                current_stock: 50,
                min_stock_level: 2,
            })
            .await
            .unwrap();

        let mut cart = Cart::new();
        cart.add_item(&switch, 2).unwrap();
        let sale = db
            .sales()
            .commit_sale(None, PaymentMode::Cash, &cart.lines)
            .await
            .unwrap();

        db.sales().void_sale(&sale.id).await.unwrap();

        let summary = db.insights().summary(None).await.unwrap();
        assert_eq!(summary.sale_count, 0);
        assert_eq!(summary.revenue_paise, 0);
    }

    #[tokio::test]
    async fn test_daily_sales_groups_by_day() {
        let db = db().await;
        seed_and_sell(&db).await;

        let daily = db.insights().daily_sales(30).await.unwrap();

        // Both sales landed today
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].sale_count, 2);
        assert_eq!(daily[0].revenue_paise, 16000);
    }
}
