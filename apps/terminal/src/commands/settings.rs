//! # Settings Commands
//!
//! The shop profile behind receipt headers and WhatsApp messages.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use haveli_core::validation::{validate_product_name, validate_tax_rate_bps};
use haveli_core::{CoreError, ShopSettings};
use haveli_db::Database;

/// The shop profile for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub shop_name: String,
    pub shop_address: String,
    pub shop_contact: String,
    pub upi_id: String,
    pub tax_rate_bps: i64,
    pub tax_rate_display: String,
}

impl From<ShopSettings> for SettingsView {
    fn from(s: ShopSettings) -> Self {
        SettingsView {
            tax_rate_display: format!("{:.2}%", s.tax_rate_bps as f64 / 100.0),
            shop_name: s.shop_name,
            shop_address: s.shop_address,
            shop_contact: s.shop_contact,
            upi_id: s.upi_id,
            tax_rate_bps: s.tax_rate_bps,
        }
    }
}

/// Operator-entered settings fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsInput {
    pub shop_name: String,
    #[serde(default)]
    pub shop_address: String,
    #[serde(default)]
    pub shop_contact: String,
    #[serde(default)]
    pub upi_id: String,
    #[serde(default)]
    pub tax_rate_bps: i64,
}

/// Returns the shop profile (fallback-safe).
pub async fn get_settings(db: &Database) -> SettingsView {
    SettingsView::from(db.settings().get_or_default().await)
}

/// Saves the shop profile.
pub async fn save_settings(
    db: &Database,
    input: SettingsInput,
) -> Result<SettingsView, ApiError> {
    debug!(shop_name = %input.shop_name, "save_settings");

    // The name rules (non-empty, bounded) fit the shop name too.
    validate_product_name(&input.shop_name).map_err(CoreError::from)?;
    validate_tax_rate_bps(input.tax_rate_bps).map_err(CoreError::from)?;

    let mut settings = ShopSettings::fallback();
    settings.shop_name = input.shop_name.trim().to_string();
    settings.shop_address = input.shop_address.trim().to_string();
    settings.shop_contact = input.shop_contact.trim().to_string();
    settings.upi_id = input.upi_id.trim().to_string();
    settings.tax_rate_bps = input.tax_rate_bps;

    let saved = db.settings().save(&settings).await?;

    info!(shop_name = %saved.shop_name, "Shop settings saved");
    Ok(SettingsView::from(saved))
}
