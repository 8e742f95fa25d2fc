//! API routes

mod auth;
mod health;
mod inventory;
pub mod metrics;
mod types;

#[cfg(test)]
pub(crate) mod testing;

use axum::{Router, extract::DefaultBodyLimit};
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

/// Request bodies are small JSON documents
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let api = Router::new()
        .merge(auth::routes())
        .nest("/inventario", inventory::routes(&state));

    let mut router = Router::new()
        // Banner and health checks
        .merge(health::routes(&state))
        .nest("/api", api)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}
