//! # Settings Repository
//!
//! The singleton shop profile row (id fixed at 1). Receipts and WhatsApp
//! messages read it; the settings screen writes it.
//!
//! A read that finds no row (or fails) must not break billing, so
//! [`SettingsRepository::get_or_default`] degrades to the built-in fallback
//! profile instead of propagating the error.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use haveli_core::{ShopSettings, SHOP_SETTINGS_ID};

/// Column list matching [`ShopSettings`] field names.
const SETTINGS_COLUMNS: &str =
    "id, shop_name, shop_address, shop_contact, upi_id, tax_rate_bps, updated_at";

/// Repository for the shop settings singleton.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Reads the shop profile.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - The seed row is missing (schema damage)
    pub async fn get(&self) -> DbResult<ShopSettings> {
        let settings = sqlx::query_as::<_, ShopSettings>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM shop_settings WHERE id = ?1"
        ))
        .bind(SHOP_SETTINGS_ID)
        .fetch_optional(&self.pool)
        .await?;

        settings.ok_or_else(|| DbError::not_found("ShopSettings", SHOP_SETTINGS_ID.to_string()))
    }

    /// Reads the shop profile, falling back to the built-in default on any
    /// failure. Receipt rendering uses this so a settings problem never
    /// blocks a sale.
    pub async fn get_or_default(&self) -> ShopSettings {
        match self.get().await {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "Could not read shop settings; using fallback profile");
                ShopSettings::fallback()
            }
        }
    }

    /// Upserts the shop profile.
    ///
    /// The id is forced to the singleton value regardless of what the caller
    /// passes; there is exactly one shop per database.
    pub async fn save(&self, settings: &ShopSettings) -> DbResult<ShopSettings> {
        debug!(shop_name = %settings.shop_name, "Saving shop settings");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO shop_settings (
                id, shop_name, shop_address, shop_contact, upi_id, tax_rate_bps, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (id) DO UPDATE SET
                shop_name = excluded.shop_name,
                shop_address = excluded.shop_address,
                shop_contact = excluded.shop_contact,
                upi_id = excluded.upi_id,
                tax_rate_bps = excluded.tax_rate_bps,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(SHOP_SETTINGS_ID)
        .bind(&settings.shop_name)
        .bind(&settings.shop_address)
        .bind(&settings.shop_contact)
        .bind(&settings.upi_id)
        .bind(settings.tax_rate_bps)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use haveli_core::DEFAULT_SHOP_NAME;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_seed_row_present_after_migration() {
        let db = db().await;
        let settings = db.settings().get().await.unwrap();

        assert_eq!(settings.id, SHOP_SETTINGS_ID);
        assert_eq!(settings.shop_name, DEFAULT_SHOP_NAME);
    }

    #[tokio::test]
    async fn test_save_upserts_singleton() {
        let db = db().await;
        let repo = db.settings();

        let mut settings = repo.get().await.unwrap();
        settings.shop_name = "Haveli Electricals & Lights".to_string();
        settings.upi_id = "haveli@upi".to_string();
        settings.tax_rate_bps = 1800;
        settings.id = 42; // must be ignored

        let saved = repo.save(&settings).await.unwrap();
        assert_eq!(saved.id, SHOP_SETTINGS_ID);
        assert_eq!(saved.shop_name, "Haveli Electricals & Lights");
        assert_eq!(saved.tax_rate_bps, 1800);

        // Still exactly one row
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop_settings")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_get_or_default_never_fails() {
        let db = db().await;

        // Remove the seed row to simulate damage.
        sqlx::query("DELETE FROM shop_settings")
            .execute(db.pool())
            .await
            .unwrap();

        let settings = db.settings().get_or_default().await;
        assert_eq!(settings.shop_name, DEFAULT_SHOP_NAME);
    }
}
