//! Database error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    #[error("Product {product_id} still has {stock} units in stock")]
    StockOnHand { product_id: i64, stock: i64 },

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl DbError {
    /// Map a UNIQUE constraint violation to `Duplicate`, keeping every other
    /// error as-is.
    pub(crate) fn unique_or(err: sqlx::Error, what: impl FnOnce() -> String) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Duplicate(what())
            }
            _ => DbError::Connection(err),
        }
    }
}
