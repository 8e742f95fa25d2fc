//! Inventory Database Layer
//!
//! Persistence for users, roles, products and goods receipts, using SQLite
//! via sqlx. The stock-mutating transaction lives here as well, since it is
//! the only multi-statement write in the system.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::{Database, PoolSettings};

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
