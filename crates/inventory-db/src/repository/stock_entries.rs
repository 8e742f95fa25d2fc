//! Goods receipt operations
//!
//! Recording a receipt is the one write that touches two tables: the audit
//! row in `stock_entries` and the running balance in `products`. Both happen
//! on a single pooled connection inside one transaction.

use chrono::Utc;
use sqlx::{Row, Sqlite, Transaction};
use tracing::{debug, error, info};

use crate::error::DbError;
use crate::models::{NewStockEntry, StockEntry};
use crate::repository::Database;

impl Database {
    /// Record a goods receipt and add its quantity to the product's stock
    ///
    /// Either both the audit row and the increment are committed or neither
    /// is. The product reference is checked by the foreign key, not looked up
    /// beforehand. Failures are returned to the caller; nothing is retried.
    pub async fn record_stock_entry(&self, entry: NewStockEntry) -> Result<StockEntry, DbError> {
        if entry.quantity <= 0 {
            return Err(DbError::InvalidValue(format!(
                "quantity must be positive, got {}",
                entry.quantity
            )));
        }

        let mut tx = self.pool.begin().await?;

        match Self::apply_stock_entry(&mut tx, &entry).await {
            Ok(recorded) => {
                tx.commit().await?;
                info!(
                    "Recorded stock entry {} for product {} (+{}) by user {}",
                    recorded.id, recorded.product_id, recorded.quantity, recorded.recorded_by
                );
                Ok(recorded)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!("Stock entry rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    /// Both statements of a goods receipt, run on the open transaction
    async fn apply_stock_entry(
        tx: &mut Transaction<'_, Sqlite>,
        entry: &NewStockEntry,
    ) -> Result<StockEntry, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO stock_entries (product_id, quantity, vehicle_plate, driver_name, notes, recorded_by, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(entry.product_id)
        .bind(entry.quantity)
        .bind(&entry.vehicle_plate)
        .bind(&entry.driver_name)
        .bind(&entry.notes)
        .bind(entry.recorded_by)
        .bind(now.to_rfc3339())
        .fetch_one(&mut **tx)
        .await?;

        let id: i64 = result.get("id");
        debug!("Appended stock entry {} for product {}", id, entry.product_id);

        let updated = sqlx::query(
            r#"
            UPDATE products
            SET current_stock = current_stock + ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(entry.quantity)
        .bind(now.to_rfc3339())
        .bind(entry.product_id)
        .execute(&mut **tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Product: {}", entry.product_id)));
        }

        Ok(StockEntry {
            id,
            product_id: entry.product_id,
            quantity: entry.quantity,
            vehicle_plate: entry.vehicle_plate.clone(),
            driver_name: entry.driver_name.clone(),
            notes: entry.notes.clone(),
            recorded_by: entry.recorded_by,
            recorded_at: now,
        })
    }

    /// Goods receipt history of one product, newest first
    pub async fn list_stock_entries(&self, product_id: i64) -> Result<Vec<StockEntry>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, quantity, vehicle_plate, driver_name, notes, recorded_by, recorded_at
            FROM stock_entries
            WHERE product_id = ?
            ORDER BY id DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| StockEntry::try_from(row).map_err(DbError::from))
            .collect()
    }
}
