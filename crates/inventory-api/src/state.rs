//! Application state

use inventory_auth::{AuthError, Authenticator, TokenService};
use inventory_db::Database;
use std::sync::Arc;

/// Prometheus handle rendered by the `/metrics` endpoint
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: Arc<TokenService>,
    pub auth: Arc<Authenticator>,
}

impl AppState {
    pub fn new(db: Database, tokens: Arc<TokenService>) -> Result<Self, AuthError> {
        let auth = Arc::new(Authenticator::new(db.clone(), tokens.clone())?);
        Ok(Self { db, tokens, auth })
    }
}
