//! # Receipt Artifact
//!
//! Read-only projections of a finalized sale:
//!
//! - [`render_document`] - a printable invoice as plain-text bytes,
//!   deterministic given its inputs (the sale timestamp is an input, not
//!   read from the clock), paginating with form feeds when the item list
//!   exceeds the page height.
//! - [`whatsapp_link`] - a `wa.me` deep link carrying a templated message
//!   with the shop name and formatted amount.
//!
//! Both are pure functions of sale data plus a [`ShopSettings`] snapshot;
//! neither touches persisted state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::money::Money;
use crate::types::{PaymentMode, ShopSettings};

/// Characters per receipt line.
const PAGE_WIDTH: usize = 42;

/// Item rows per page before a form-feed break.
const ITEMS_PER_PAGE: usize = 18;

/// Indian country calling code, prefixed onto 10-digit local numbers.
const COUNTRY_CODE: &str = "91";

// =============================================================================
// Receipt Line
// =============================================================================

/// One printable item row. Callers build these from cart lines (pre-void
/// display) or persisted sale items (name snapshot + frozen price).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub price_paise: i64,
}

// =============================================================================
// Document Rendering
// =============================================================================

/// Renders the printable invoice document.
///
/// Layout follows the shop's paper invoice: centered shop header, invoice
/// info block, item table, grand total, footer note. Items beyond
/// [`ITEMS_PER_PAGE`] continue on a new page after a form feed.
pub fn render_document(
    settings: &ShopSettings,
    sale_id: &str,
    created_at: DateTime<Utc>,
    items: &[ReceiptLine],
    total: Money,
    customer_phone: Option<&str>,
    payment_mode: PaymentMode,
) -> Vec<u8> {
    let mut out = String::new();
    let rule = "-".repeat(PAGE_WIDTH);

    // Header
    out.push_str(&center(&settings.shop_name.to_uppercase()));
    out.push('\n');
    if !settings.shop_address.is_empty() {
        out.push_str(&center(&truncate(&settings.shop_address, PAGE_WIDTH)));
        out.push('\n');
    }
    if !settings.shop_contact.is_empty() {
        out.push_str(&center(&format!("Contact: {}", settings.shop_contact)));
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');

    // Invoice info
    let short_id = &sale_id[..sale_id.len().min(8)];
    out.push_str(&two_columns(
        &format!("Invoice ID: {}", short_id),
        &format!("Payment: {}", payment_mode.label()),
    ));
    out.push('\n');
    let customer = match customer_phone {
        Some(phone) if !phone.trim().is_empty() => phone.trim(),
        _ => "Walk-in",
    };
    out.push_str(&two_columns(
        &format!("Customer: {}", customer),
        &format!("Date: {}", created_at.format("%d-%m-%Y")),
    ));
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    // Item table
    out.push_str(&item_row("Item Description", "Qty", "Price (Rs.)"));
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for (i, item) in items.iter().enumerate() {
        if i > 0 && i % ITEMS_PER_PAGE == 0 {
            // Page break; the table continues without reprinting the header.
            out.push('\u{0c}');
        }
        out.push_str(&item_row(
            &truncate(&item.name, 24),
            &item.quantity.to_string(),
            &Money::from_paise(item.price_paise).format_grouped(),
        ));
        out.push('\n');
    }

    // Footer
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&right(&format!("TOTAL AMOUNT: Rs. {}", total.format_grouped())));
    out.push('\n');
    if settings.tax_rate_bps > 0 {
        let tax = total.calculate_tax(settings.tax_rate_bps as u32);
        out.push_str(&right(&format!(
            "Incl. GST ({:.2}%): Rs. {}",
            settings.tax_rate_bps as f64 / 100.0,
            tax.format_grouped()
        )));
        out.push('\n');
    }
    if !settings.upi_id.is_empty() {
        out.push_str(&center(&format!("Pay via UPI: {}", settings.upi_id)));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&center(
        "This is a computer-generated invoice.",
    ));
    out.push('\n');
    out.push_str(&center("Thank you for your business!"));
    out.push('\n');

    out.into_bytes()
}

// =============================================================================
// WhatsApp Deep Link
// =============================================================================

/// Normalizes a customer phone number for the deep link.
///
/// A 10-digit local number gets the `91` country code prefixed; anything
/// else passes through trimmed. No correctness validation beyond that
/// heuristic.
pub fn normalize_phone(phone: &str) -> String {
    let phone = phone.trim();
    if phone.len() == 10
        && !phone.starts_with(COUNTRY_CODE)
        && phone.chars().all(|c| c.is_ascii_digit())
    {
        return format!("{}{}", COUNTRY_CODE, phone);
    }
    phone.to_string()
}

/// Builds the `wa.me` deep link with the pre-filled receipt message.
///
/// The shop name comes from the settings snapshot; callers that could not
/// read settings pass the fallback profile instead of failing.
pub fn whatsapp_link(settings: &ShopSettings, phone: &str, amount: Money) -> String {
    let message = format!(
        "Hello! Your invoice from {} for Rs. {} has been generated. Thank you!",
        settings.shop_name,
        amount.format_grouped()
    );

    let base = format!("https://wa.me/{}", normalize_phone(phone));
    match Url::parse_with_params(&base, &[("text", message.as_str())]) {
        Ok(url) => url.to_string(),
        // The base is a constant-shaped https URL; parse failure would mean
        // a phone string hostile enough that an unencoded fallback is moot.
        Err(_) => base,
    }
}

// =============================================================================
// Layout Helpers
// =============================================================================

fn center(text: &str) -> String {
    let text = truncate(text, PAGE_WIDTH);
    let pad = PAGE_WIDTH.saturating_sub(text.len()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

fn right(text: &str) -> String {
    let text = truncate(text, PAGE_WIDTH);
    format!("{:>width$}", text, width = PAGE_WIDTH)
}

fn two_columns(left_text: &str, right_text: &str) -> String {
    let fill = PAGE_WIDTH.saturating_sub(left_text.len() + right_text.len());
    format!("{}{}{}", left_text, " ".repeat(fill.max(1)), right_text)
}

fn item_row(name: &str, qty: &str, price: &str) -> String {
    // 24-char name column, 5-char qty column, rest for the price.
    format!("{:<24}{:>5}{:>13}", truncate(name, 24), qty, price)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
