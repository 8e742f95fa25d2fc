//! Inventory REST API
//!
//! Axum routes for authentication, the product catalog and goods receipts,
//! plus the health and metrics endpoints.

pub mod error;
mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
