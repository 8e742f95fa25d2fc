//! Service banner and health check endpoints

use axum::{Json, Router, middleware::from_fn_with_state, routing::get};
use inventory_auth::{AuthUser, optional_auth};
use serde::Serialize;
use tracing::debug;

use crate::state::AppState;

/// Health status response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /
///
/// Reachable without a token; a valid one is only used to log who asked.
async fn banner(user: Option<AuthUser>) -> &'static str {
    if let Some(user) = user {
        debug!("Banner requested by user {}", user.id);
    }
    "Backend del proyecto Inventario funcionando"
}

/// Health check handler
async fn health() -> Json<HealthResponse> {
    metrics::counter!("inventory_health_checks_total").increment(1);

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create banner and health routes
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(banner).route_layer(from_fn_with_state(state.tokens.clone(), optional_auth)),
        )
        .route("/health", get(health))
        .route("/healthz", get(health))
}
