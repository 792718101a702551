//! # Insights Commands
//!
//! Read-only analytics views over finalized sales.

use serde::Serialize;

use crate::error::ApiError;
use haveli_core::Money;
use haveli_db::repository::insights::{DailySales, PaymentBreakdown, ProductPerformance};
use haveli_db::Database;

/// Overall totals with formatted amounts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub sale_count: i64,
    pub units_sold: i64,
    pub revenue_paise: i64,
    pub revenue_display: String,
    pub profit_paise: i64,
    pub profit_display: String,
}

/// One day's aggregate with formatted amounts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyView {
    pub day: String,
    pub sale_count: i64,
    pub revenue_display: String,
    pub profit_display: String,
}

/// One product's performance with formatted amounts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPerformanceView {
    pub name: String,
    pub units_sold: i64,
    pub revenue_display: String,
    pub profit_display: String,
}

/// One payment mode's slice with formatted amounts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdownView {
    pub payment_mode: String,
    pub sale_count: i64,
    pub revenue_display: String,
}

/// Overall totals across all sales.
pub async fn sales_summary(db: &Database) -> Result<SummaryView, ApiError> {
    let s = db.insights().summary(None).await?;

    Ok(SummaryView {
        sale_count: s.sale_count,
        units_sold: s.units_sold,
        revenue_paise: s.revenue_paise,
        revenue_display: Money::from_paise(s.revenue_paise).format_grouped(),
        profit_paise: s.profit_paise,
        profit_display: Money::from_paise(s.profit_paise).format_grouped(),
    })
}

/// Day-by-day revenue and profit, oldest first.
pub async fn daily_sales(db: &Database, days: u32) -> Result<Vec<DailyView>, ApiError> {
    let rows = db.insights().daily_sales(days).await?;

    Ok(rows
        .into_iter()
        .map(|d: DailySales| DailyView {
            day: d.day,
            sale_count: d.sale_count,
            revenue_display: Money::from_paise(d.revenue_paise).format_grouped(),
            profit_display: Money::from_paise(d.profit_paise).format_grouped(),
        })
        .collect())
}

/// Best-selling products by revenue.
pub async fn top_products(
    db: &Database,
    limit: u32,
) -> Result<Vec<ProductPerformanceView>, ApiError> {
    let rows = db.insights().top_products(limit).await?;

    Ok(rows
        .into_iter()
        .map(|p: ProductPerformance| ProductPerformanceView {
            name: p.name,
            units_sold: p.units_sold,
            revenue_display: Money::from_paise(p.revenue_paise).format_grouped(),
            profit_display: Money::from_paise(p.profit_paise).format_grouped(),
        })
        .collect())
}

/// Revenue split by payment mode.
pub async fn payment_breakdown(db: &Database) -> Result<Vec<PaymentBreakdownView>, ApiError> {
    let rows = db.insights().payment_breakdown().await?;

    Ok(rows
        .into_iter()
        .map(|b: PaymentBreakdown| PaymentBreakdownView {
            payment_mode: b.payment_mode,
            sale_count: b.sale_count,
            revenue_display: Money::from_paise(b.revenue_paise).format_grouped(),
        })
        .collect())
}
