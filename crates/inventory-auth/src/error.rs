//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use inventory_db::DbError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Why a bearer token was not accepted
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Token malformed or signature invalid")]
    Malformed,

    #[error("Token not yet valid")]
    NotYetValid,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Token rejected: {0}")]
    Token(#[from] TokenError),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Token signing secret is not configured")]
    MissingSecret,

    #[error("Token lifetime of {0} hours is out of range")]
    InvalidTokenTtl(i64),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::Token(_) | AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::MissingSecret
            | AuthError::InvalidTokenTtl(_)
            | AuthError::PasswordHash(_)
            | AuthError::Jwt(_)
            | AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message; never carries internal detail
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Credenciales inválidas.",
            AuthError::MissingAuthHeader | AuthError::InvalidAuthHeader => {
                "Acceso denegado. No se proporcionó token o formato incorrecto."
            }
            AuthError::MissingToken => "Acceso denegado. No se proporcionó token.",
            AuthError::Token(TokenError::Expired) => {
                "Token expirado. Por favor, inicie sesión nuevamente."
            }
            AuthError::Token(TokenError::Malformed) => "Token inválido.",
            AuthError::Token(TokenError::NotYetValid) => "Token no activo.",
            AuthError::InsufficientPermissions => {
                "Acceso denegado. Su rol no tiene permisos para esta acción."
            }
            AuthError::EmailTaken => "El correo electrónico ya está registrado.",
            AuthError::MissingSecret
            | AuthError::InvalidTokenTtl(_)
            | AuthError::PasswordHash(_)
            | AuthError::Jwt(_)
            | AuthError::Database(_) => "Error interno del servidor.",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Authentication failure: {}", self);
        }

        let body = axum::Json(json!({
            "message": self.public_message()
        }));

        (status, body).into_response()
    }
}
