//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use inventory_auth::AuthError;
use inventory_db::DbError;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

pub(crate) const INTERNAL_MESSAGE: &str = "Error interno del servidor.";
pub(crate) const STOCK_ON_HAND_MESSAGE: &str =
    "No se puede descontinuar un producto con Stock físico activo.";

/// Handler errors
///
/// The string carried by `NotFound`, `BadRequest`, `Conflict` and `Internal`
/// is the client-facing message.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

impl ApiError {
    pub(crate) fn bad_request(message: &str) -> Self {
        ApiError::BadRequest(message.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Auth(e) => return e.into_response(),
            ApiError::Database(e) => match e {
                DbError::NotFound(what) => {
                    debug!("Not found: {}", what);
                    (StatusCode::NOT_FOUND, "Producto no encontrado".to_string())
                }
                DbError::Duplicate(what) => {
                    debug!("Duplicate: {}", what);
                    (
                        StatusCode::CONFLICT,
                        "El Código de Barras ya existe.".to_string(),
                    )
                }
                DbError::StockOnHand { product_id, stock } => {
                    debug!(
                        "Refused to deactivate product {} with {} units on hand",
                        product_id, stock
                    );
                    (StatusCode::BAD_REQUEST, STOCK_ON_HAND_MESSAGE.to_string())
                }
                DbError::InvalidValue(what) => {
                    debug!("Invalid value: {}", what);
                    (StatusCode::BAD_REQUEST, "Datos inválidos.".to_string())
                }
                DbError::Connection(e) => {
                    error!("Database failure: {}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
                }
            },
        };

        let body = axum::Json(json!({
            "message": message
        }));

        (status, body).into_response()
    }
}
