//! Product operations

use chrono::Utc;
use sqlx::Row;
use tracing::debug;

use crate::error::DbError;
use crate::models::{NewProduct, Product, ProductStatus, UpdateProduct};
use crate::repository::Database;

const PRODUCT_COLUMNS: &str = r#"
    SELECT id, name, brand, model, color, barcode, current_stock, min_stock, max_stock,
           warehouse_location, status, created_at, updated_at
    FROM products
"#;

/// Reject negative quantities and inverted thresholds
fn validate_levels(
    current_stock: Option<i64>,
    min_stock: Option<i64>,
    max_stock: Option<i64>,
) -> Result<(), DbError> {
    if current_stock.is_some_and(|s| s < 0) {
        return Err(DbError::InvalidValue("current stock cannot be negative".to_string()));
    }
    if min_stock.is_some_and(|s| s < 0) || max_stock.is_some_and(|s| s < 0) {
        return Err(DbError::InvalidValue("stock thresholds cannot be negative".to_string()));
    }
    if let (Some(min), Some(max)) = (min_stock, max_stock)
        && min > max
    {
        return Err(DbError::InvalidValue(format!(
            "minimum stock {} exceeds maximum stock {}",
            min, max
        )));
    }
    Ok(())
}

impl Database {
    // ==================== Product Operations ====================

    /// List every product, archived ones included, newest first
    pub async fn list_products(&self) -> Result<Vec<Product>, DbError> {
        let sql = format!("{} ORDER BY id DESC", PRODUCT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| Product::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Get a product by ID
    pub async fn get_product(&self, id: i64) -> Result<Option<Product>, DbError> {
        let sql = format!("{} WHERE id = ?", PRODUCT_COLUMNS);
        let result = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| Product::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Insert a new product
    pub async fn create_product(&self, product: NewProduct) -> Result<Product, DbError> {
        validate_levels(
            Some(product.current_stock),
            product.min_stock,
            product.max_stock,
        )?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO products (name, brand, model, color, barcode, current_stock, min_stock,
                                  max_stock, warehouse_location, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&product.name)
        .bind(&product.brand)
        .bind(&product.model)
        .bind(&product.color)
        .bind(&product.barcode)
        .bind(product.current_stock)
        .bind(product.min_stock)
        .bind(product.max_stock)
        .bind(&product.warehouse_location)
        .bind(ProductStatus::Active.as_str())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DbError::unique_or(e, || format!("Barcode '{}' already exists", product.barcode))
        })?;

        let id: i64 = result.get("id");
        debug!("Created product {} ({})", id, product.barcode);

        Ok(Product {
            id,
            name: product.name,
            brand: product.brand,
            model: product.model,
            color: product.color,
            barcode: product.barcode,
            current_stock: product.current_stock,
            min_stock: product.min_stock,
            max_stock: product.max_stock,
            warehouse_location: product.warehouse_location,
            status: ProductStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update to a product
    ///
    /// The "inactive only at zero stock" rule is part of the UPDATE's WHERE
    /// clause, evaluated against the row as it is at write time. It applies
    /// to edits that move an active product to INACTIVO or that set the stock
    /// of an inactive one. An archived product that received goods afterwards
    /// can still be renamed or relocated.
    pub async fn update_product(&self, id: i64, update: UpdateProduct) -> Result<Product, DbError> {
        validate_levels(update.current_stock, update.min_stock, update.max_stock)?;

        let now = Utc::now();
        let status = update.status.map(|s| s.as_str());
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE(?, name),
                brand = COALESCE(?, brand),
                model = COALESCE(?, model),
                color = COALESCE(?, color),
                min_stock = COALESCE(?, min_stock),
                max_stock = COALESCE(?, max_stock),
                warehouse_location = COALESCE(?, warehouse_location),
                current_stock = COALESCE(?, current_stock),
                status = COALESCE(?, status),
                updated_at = ?
            WHERE id = ?
              AND NOT (
                  COALESCE(?, status) = 'INACTIVO'
                  AND COALESCE(?, current_stock) > 0
                  AND (status = 'ACTIVO' OR ? IS NOT NULL)
              )
            "#,
        )
        .bind(&update.name)
        .bind(&update.brand)
        .bind(&update.model)
        .bind(&update.color)
        .bind(update.min_stock)
        .bind(update.max_stock)
        .bind(&update.warehouse_location)
        .bind(update.current_stock)
        .bind(status)
        .bind(now.to_rfc3339())
        .bind(id)
        .bind(status)
        .bind(update.current_stock)
        .bind(update.current_stock)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.explain_refused_deactivation(id, update.current_stock).await);
        }

        self.get_product(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Product: {}", id)))
    }

    /// Archive (soft-delete) a product
    ///
    /// Only a product with zero stock on hand can be archived. Archiving an
    /// already archived product succeeds without changing it. Stock entry
    /// history is never touched.
    pub async fn archive_product(&self, id: i64) -> Result<Product, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE products
            SET status = 'INACTIVO',
                updated_at = CASE WHEN status = 'INACTIVO' THEN updated_at ELSE ? END
            WHERE id = ? AND current_stock = 0
            "#,
        )
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.explain_refused_deactivation(id, None).await);
        }

        self.get_product(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Product: {}", id)))
    }

    /// Work out why a guarded status change matched no row
    async fn explain_refused_deactivation(&self, id: i64, requested_stock: Option<i64>) -> DbError {
        match self.get_product(id).await {
            Ok(Some(product)) => DbError::StockOnHand {
                product_id: id,
                stock: requested_stock.unwrap_or(product.current_stock),
            },
            Ok(None) => DbError::NotFound(format!("Product: {}", id)),
            Err(e) => e,
        }
    }
}
