//! Registration and login routes

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use inventory_auth::{AuthError, Registration};
use inventory_db::Role;
use tracing::debug;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

use super::types::{LoginRequest, LoginResponse, LoginUser, RegisterRequest, RegisterResponse, present};

/// Maximum accepted email length
const MAX_EMAIL_LENGTH: usize = 254;
/// Maximum accepted password length; bounds the hashing work per request
const MAX_PASSWORD_LENGTH: usize = 256;

fn validate_lengths(email: &str, password: &str) -> Result<(), ApiError> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ApiError::bad_request(
            "El correo electrónico excede la longitud máxima permitida.",
        ));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(
            "La contraseña excede la longitud máxima permitida.",
        ));
    }
    Ok(())
}

/// POST /api/auth/registro
async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let (Some(email), Some(password), Some(role_id)) = (
        present(request.correo_electronico),
        present(request.contrasena),
        request.id_rol.filter(|&id| id != 0),
    ) else {
        return Err(ApiError::bad_request(
            "Faltan campos obligatorios (correo, contraseña, rol).",
        ));
    };
    validate_lengths(&email, &password)?;

    let role = Role::from_id(role_id)
        .ok_or_else(|| ApiError::bad_request("El rol indicado no existe."))?;

    debug!("Registration attempt for: {}", email);

    let user_id = state
        .auth
        .register(Registration {
            email,
            password,
            role,
            first_name: present(request.nombre),
            last_name: present(request.apellido),
            national_id: present(request.cedula),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Usuario registrado exitosamente.",
            user_id,
        }),
    ))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (Some(email), Some(password)) = (
        present(request.correo_electronico),
        present(request.contrasena),
    ) else {
        return Err(ApiError::bad_request(
            "Debe ingresar correo electrónico y contraseña.",
        ));
    };
    validate_lengths(&email, &password)?;

    debug!("Login attempt for: {}", email);

    let outcome = match state.auth.login(&email, &password).await {
        Ok(outcome) => {
            metrics::counter!("inventory_logins_total", "outcome" => "success").increment(1);
            outcome
        }
        Err(e) => {
            if matches!(e, AuthError::InvalidCredentials) {
                metrics::counter!("inventory_logins_total", "outcome" => "failure").increment(1);
            }
            return Err(e.into());
        }
    };

    Ok(Json(LoginResponse {
        message: "Login exitoso.",
        token: outcome.token,
        usuario: LoginUser {
            id: outcome.user_id,
            rol: outcome.role_name,
        },
    }))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/registro", post(register))
        .route("/auth/login", post(login))
}
