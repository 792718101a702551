//! # Product Commands
//!
//! Inventory management: catalogue CRUD, restock, low-stock report and
//! bulk import.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use haveli_core::validation::{
    validate_price_paise, validate_product_name, validate_stock_level, validate_uuid,
};
use haveli_core::{CoreError, Money, Product};
use haveli_db::{Database, NewProduct};

/// A catalogue row for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub cost_price_display: String,
    pub selling_price_display: String,
    pub selling_price_paise: i64,
    pub current_stock: i64,
    pub min_stock_level: i64,
    pub low_stock: bool,
}

impl From<Product> for ProductView {
    fn from(p: Product) -> Self {
        ProductView {
            cost_price_display: Money::from_paise(p.cost_price_paise).format_grouped(),
            selling_price_display: Money::from_paise(p.selling_price_paise).format_grouped(),
            selling_price_paise: p.selling_price_paise,
            low_stock: p.is_low_stock(),
            id: p.id,
            name: p.name,
            category: p.category,
            current_stock: p.current_stock,
            min_stock_level: p.min_stock_level,
        }
    }
}

/// Operator-entered product fields, shared by add and bulk import.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub cost_price_paise: i64,
    pub selling_price_paise: i64,
    pub current_stock: i64,
    #[serde(default)]
    pub min_stock_level: i64,
}

impl ProductInput {
    fn validate(&self) -> Result<(), ApiError> {
        validate_product_name(&self.name).map_err(CoreError::from)?;
        validate_price_paise(self.cost_price_paise).map_err(CoreError::from)?;
        validate_price_paise(self.selling_price_paise).map_err(CoreError::from)?;
        validate_stock_level(self.current_stock).map_err(CoreError::from)?;
        validate_stock_level(self.min_stock_level).map_err(CoreError::from)?;
        Ok(())
    }

    fn into_new_product(self) -> NewProduct {
        NewProduct {
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            cost_price_paise: self.cost_price_paise,
            selling_price_paise: self.selling_price_paise,
            current_stock: self.current_stock,
            min_stock_level: self.min_stock_level,
        }
    }
}

/// Lists the whole catalogue.
pub async fn list_products(db: &Database) -> Result<Vec<ProductView>, ApiError> {
    let products = db.products().list_all().await?;
    Ok(products.into_iter().map(ProductView::from).collect())
}

/// Searches the catalogue by name fragment.
pub async fn search_products(db: &Database, fragment: &str) -> Result<Vec<ProductView>, ApiError> {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return Err(ApiError::validation("Search text is empty"));
    }

    let products = db.products().search(fragment).await?;
    Ok(products.into_iter().map(ProductView::from).collect())
}

/// Lists only products with stock on hand (what the billing screen offers).
pub async fn list_sellable(db: &Database) -> Result<Vec<ProductView>, ApiError> {
    let products = db.products().list_in_stock().await?;
    Ok(products.into_iter().map(ProductView::from).collect())
}

/// Adds a single product to the catalogue.
pub async fn add_product(db: &Database, input: ProductInput) -> Result<ProductView, ApiError> {
    debug!(name = %input.name, "add_product");

    input.validate()?;

    let product = db.products().insert(input.into_new_product()).await?;

    info!(id = %product.id, name = %product.name, "Product added");
    Ok(ProductView::from(product))
}

/// Bulk-imports products; all rows validate first, then insert in one
/// transaction. A bad row anywhere means nothing is imported.
pub async fn import_products(
    db: &Database,
    inputs: Vec<ProductInput>,
) -> Result<Vec<ProductView>, ApiError> {
    debug!(count = inputs.len(), "import_products");

    if inputs.is_empty() {
        return Err(ApiError::validation("Import contains no rows"));
    }

    for (idx, input) in inputs.iter().enumerate() {
        input.validate().map_err(|e| {
            ApiError::validation(format!("Row {}: {}", idx + 1, e.message))
        })?;
    }

    let rows = inputs.into_iter().map(ProductInput::into_new_product).collect();
    let products = db.products().bulk_insert(rows).await?;

    info!(count = products.len(), "Catalogue imported");
    Ok(products.into_iter().map(ProductView::from).collect())
}

/// Updates a product's editable fields (name, category, prices, reorder
/// level). Stock moves only through restock and the sale protocols.
pub async fn update_product(
    db: &Database,
    id: &str,
    input: ProductInput,
) -> Result<ProductView, ApiError> {
    debug!(id = %id, "update_product");

    validate_uuid(id).map_err(CoreError::from)?;
    input.validate()?;

    let mut product = db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;

    product.name = input.name.trim().to_string();
    product.category = input.category.trim().to_string();
    product.cost_price_paise = input.cost_price_paise;
    product.selling_price_paise = input.selling_price_paise;
    product.min_stock_level = input.min_stock_level;

    db.products().update(&product).await?;

    let updated = db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;

    Ok(ProductView::from(updated))
}

/// Adds received units to a product's stock.
pub async fn restock_product(
    db: &Database,
    id: &str,
    quantity: i64,
) -> Result<ProductView, ApiError> {
    debug!(id = %id, quantity = quantity, "restock_product");

    validate_uuid(id).map_err(CoreError::from)?;
    if quantity <= 0 {
        return Err(ApiError::validation("Restock quantity must be positive"));
    }

    db.products().adjust_stock(id, quantity).await?;

    let product = db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;

    info!(id = %id, stock = product.current_stock, "Product restocked");
    Ok(ProductView::from(product))
}

/// Removes a product from the catalogue.
///
/// Fails if any sale item references it; sold products stay for history.
pub async fn delete_product(db: &Database, id: &str) -> Result<(), ApiError> {
    debug!(id = %id, "delete_product");

    validate_uuid(id).map_err(CoreError::from)?;
    db.products().delete(id).await?;

    info!(id = %id, "Product deleted");
    Ok(())
}

/// Products at or below the reorder threshold.
pub async fn low_stock_report(
    db: &Database,
    threshold: i64,
) -> Result<Vec<ProductView>, ApiError> {
    let products = db.products().low_stock(threshold).await?;
    Ok(products.into_iter().map(ProductView::from).collect())
}
