//! # Sale Commands
//!
//! Finalizing the bill, voiding sales, receipt artifacts.
//!
//! ## Finalize Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  finalize_bill()                                                        │
//! │                                                                         │
//! │  1. Parse payment mode, validate phone (if any)                        │
//! │  2. Snapshot cart lines under the lock (empty cart → CartEmpty)        │
//! │  3. commit_sale() - transaction with guarded stock decrements          │
//! │       │                                                                 │
//! │       ├── StockConflict → cart KEPT so the operator can adjust         │
//! │       ▼                                                                 │
//! │  4. Render invoice document + WhatsApp link (settings fallback-safe)   │
//! │  5. Store as last_sale, clear cart                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::session::{FinalizedSale, SessionState};
use haveli_core::receipt::{render_document, whatsapp_link, ReceiptLine};
use haveli_core::validation::{validate_phone, validate_uuid};
use haveli_core::{CoreError, Money, PaymentMode, Sale};
use haveli_db::Database;

/// Result of finalizing a bill.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub sale_id: String,
    pub short_id: String,
    pub total_paise: i64,
    pub total_display: String,
    pub item_count: usize,
    pub payment_mode: String,
    pub whatsapp_link: Option<String>,
}

/// A recent sale row for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleView {
    pub id: String,
    pub short_id: String,
    pub customer: String,
    pub total_display: String,
    pub payment_mode: String,
    pub created_at: String,
}

impl From<Sale> for SaleView {
    fn from(sale: Sale) -> Self {
        SaleView {
            short_id: sale.short_id().to_string(),
            customer: sale
                .customer_phone
                .clone()
                .unwrap_or_else(|| "Walk-in".to_string()),
            total_display: sale.total().format_grouped(),
            payment_mode: sale.payment_mode.label().to_string(),
            created_at: sale.created_at.format("%d-%m-%Y %H:%M").to_string(),
            id: sale.id,
        }
    }
}

/// Finalizes the current bill as a sale.
///
/// On success the cart is cleared and the receipt artifacts are kept as
/// the session's last sale. On a stock conflict the cart is left intact
/// and nothing was written; the operator adjusts the bill and retries.
pub async fn finalize_bill(
    db: &Database,
    session: &SessionState,
    customer_phone: Option<&str>,
    payment_mode: &str,
) -> Result<FinalizeResponse, ApiError> {
    debug!(payment_mode = %payment_mode, "finalize_bill");

    let mode = PaymentMode::parse(payment_mode)
        .ok_or_else(|| ApiError::validation(format!("Unknown payment mode '{}'", payment_mode)))?;

    let phone = match customer_phone.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => {
            validate_phone(p).map_err(CoreError::from)?;
            Some(p.to_string())
        }
        None => None,
    };

    // Snapshot the lines; the lock is not held across the commit await.
    let lines = session.with_session(|s| s.cart.lines.clone());
    if lines.is_empty() {
        return Err(CoreError::CartEmpty.into());
    }

    let sale = db
        .sales()
        .commit_sale(phone.as_deref(), mode, &lines)
        .await?;

    let items = db.sales().get_items(&sale.id).await?;
    let settings = db.settings().get_or_default().await;

    let receipt_lines: Vec<ReceiptLine> = items
        .iter()
        .map(|i| ReceiptLine {
            name: i.name_snapshot.clone(),
            quantity: i.quantity,
            price_paise: i.price_at_sale_paise,
        })
        .collect();

    let document = render_document(
        &settings,
        &sale.id,
        sale.created_at,
        &receipt_lines,
        sale.total(),
        sale.customer_phone.as_deref(),
        sale.payment_mode,
    );

    let link = sale
        .customer_phone
        .as_deref()
        .map(|p| whatsapp_link(&settings, p, sale.total()));

    let response = FinalizeResponse {
        sale_id: sale.id.clone(),
        short_id: sale.short_id().to_string(),
        total_paise: sale.total_paise,
        total_display: sale.total().format_grouped(),
        item_count: items.len(),
        payment_mode: sale.payment_mode.label().to_string(),
        whatsapp_link: link.clone(),
    };

    info!(
        sale_id = %sale.id,
        total = %Money::from_paise(sale.total_paise),
        items = items.len(),
        "Bill finalized"
    );

    session.with_session_mut(|s| {
        s.last_sale = Some(FinalizedSale {
            sale,
            items,
            document,
            whatsapp_link: link,
        });
        s.cart.clear();
    });

    Ok(response)
}

/// Returns the last finalized sale's receipt artifacts.
pub fn last_receipt(session: &SessionState) -> Result<FinalizedSale, ApiError> {
    session
        .with_session(|s| s.last_sale.clone())
        .ok_or_else(|| ApiError::not_found("Receipt", "last sale"))
}

/// Voids the session's last finalized sale.
///
/// Clears `last_sale` on success so the void cannot be repeated from the
/// same button.
pub async fn void_last_sale(db: &Database, session: &SessionState) -> Result<SaleView, ApiError> {
    let last = session
        .with_session(|s| s.last_sale.clone())
        .ok_or_else(|| ApiError::not_found("Sale", "last sale"))?;

    let view = void_sale_by_id(db, &last.sale.id).await?;

    session.with_session_mut(|s| s.last_sale = None);

    Ok(view)
}

/// Voids any finalized sale by ID, restoring its stock.
pub async fn void_sale_by_id(db: &Database, sale_id: &str) -> Result<SaleView, ApiError> {
    debug!(sale_id = %sale_id, "void_sale_by_id");

    validate_uuid(sale_id).map_err(CoreError::from)?;

    let sale = db
        .sales()
        .get_by_id(sale_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", sale_id))?;

    db.sales().void_sale(sale_id).await?;

    info!(sale_id = %sale_id, "Sale voided, stock restored");

    Ok(SaleView::from(sale))
}

/// Lists recent sales, newest first.
pub async fn list_recent_sales(db: &Database, limit: u32) -> Result<Vec<SaleView>, ApiError> {
    let sales = db.sales().list_recent(limit).await?;
    Ok(sales.into_iter().map(SaleView::from).collect())
}
