//! # Cart Commands
//!
//! Building the pending bill. Add looks the product up live so the stock
//! snapshot the cart checks against is as fresh as possible; the commit
//! protocol still re-validates.

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::session::SessionState;
use haveli_core::Money;
use haveli_db::Database;

/// One bill line for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price_paise: i64,
    pub unit_price_display: String,
    pub line_total_paise: i64,
    pub line_total_display: String,
}

/// The whole bill for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub line_count: usize,
    pub total_quantity: i64,
    pub total_paise: i64,
    pub total_display: String,
}

/// Returns the current bill.
pub fn get_cart(session: &SessionState) -> CartView {
    session.with_session(|s| {
        let lines = s
            .cart
            .lines
            .iter()
            .map(|l| CartLineView {
                product_id: l.product_id.clone(),
                name: l.name.clone(),
                quantity: l.quantity,
                unit_price_paise: l.unit_price_paise,
                unit_price_display: Money::from_paise(l.unit_price_paise).format_grouped(),
                line_total_paise: l.line_total().paise(),
                line_total_display: l.line_total().format_grouped(),
            })
            .collect();

        CartView {
            lines,
            line_count: s.cart.line_count(),
            total_quantity: s.cart.total_quantity(),
            total_paise: s.cart.total().paise(),
            total_display: s.cart.total().format_grouped(),
        }
    })
}

/// Adds a product to the bill by name, merging into an existing line.
///
/// The product must exist and the requested quantity (combined with any
/// quantity already on the bill) must fit within current stock.
pub async fn add_to_cart(
    db: &Database,
    session: &SessionState,
    name: &str,
    quantity: i64,
) -> Result<CartView, ApiError> {
    debug!(name = %name, quantity = quantity, "add_to_cart");

    let product = db
        .products()
        .get_by_name(name)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", name))?;

    session.with_session_mut(|s| s.cart.add_item(&product, quantity))?;

    Ok(get_cart(session))
}

/// Overrides quantity and unit price on a bill line, keyed by name.
///
/// Deliberately no stock check here: the operator may be correcting a
/// price or trimming a quantity, and the commit protocol has the final say.
pub fn edit_cart_line(
    session: &SessionState,
    name: &str,
    quantity: i64,
    unit_price_paise: i64,
) -> Result<CartView, ApiError> {
    debug!(name = %name, quantity = quantity, price = unit_price_paise, "edit_cart_line");

    session.with_session_mut(|s| s.cart.edit_line(name, quantity, unit_price_paise))?;

    Ok(get_cart(session))
}

/// Removes a line from the bill by product ID.
pub fn remove_from_cart(session: &SessionState, product_id: &str) -> Result<CartView, ApiError> {
    debug!(product_id = %product_id, "remove_from_cart");

    session.with_session_mut(|s| s.cart.remove_line(product_id))?;

    Ok(get_cart(session))
}

/// Discards the whole bill.
pub fn clear_cart(session: &SessionState) -> CartView {
    debug!("clear_cart");

    session.with_session_mut(|s| s.cart.clear());
    get_cart(session)
}
