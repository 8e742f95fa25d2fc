//! Registration and login flows

use inventory_db::{Database, DbError, NewUser, Role};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::jwt::TokenService;
use crate::password::{hash_password, verify_password};

/// Account creation request, already checked for required fields
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_id: Option<String>,
}

/// A successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user_id: i64,
    pub role: Role,
    pub role_name: String,
}

/// Credential checks against the user store
pub struct Authenticator {
    db: Database,
    tokens: Arc<TokenService>,
    /// Verified in place of a real hash when the email is unknown, so both
    /// failure paths cost one Argon2 verification
    dummy_hash: String,
}

impl Authenticator {
    pub fn new(db: Database, tokens: Arc<TokenService>) -> Result<Self, AuthError> {
        let dummy_hash = hash_password("inventory-login-placeholder")?;
        Ok(Self {
            db,
            tokens,
            dummy_hash,
        })
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Create an account and return the new user id
    ///
    /// The email pre-check gives a fast answer; the unique index decides when
    /// two registrations race.
    pub async fn register(&self, registration: Registration) -> Result<i64, AuthError> {
        if self.db.email_exists(&registration.email).await? {
            debug!("Registration refused, email in use: {}", registration.email);
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_blocking(registration.password).await?;

        let user = self
            .db
            .insert_user(NewUser {
                email: registration.email,
                password_hash,
                role: registration.role,
                first_name: registration.first_name,
                last_name: registration.last_name,
                national_id: registration.national_id,
            })
            .await
            .map_err(|e| match e {
                DbError::Duplicate(_) => AuthError::EmailTaken,
                other => AuthError::Database(other),
            })?;

        info!(
            "Registered user {} ({}) as {}",
            user.id,
            user.email,
            user.role.as_str()
        );
        Ok(user.id)
    }

    /// Check credentials and issue a bearer token
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let user = self.db.get_user_by_email(email).await?;

        let hash = match &user {
            Some(u) => u.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };
        let password_valid = verify_blocking(password.to_string(), hash).await?;

        let user = match (user, password_valid) {
            (Some(u), true) => u,
            _ => {
                warn!("Failed login attempt for: {}", email);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.tokens.issue(user.id, user.role)?;
        info!("User {} logged in", user.id);

        Ok(LoginOutcome {
            token,
            user_id: user.id,
            role: user.role,
            role_name: user.role_name,
        })
    }
}

async fn hash_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::PasswordHash(format!("hashing task failed: {e}")))?
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::PasswordHash(format!("verification task failed: {e}")))?
}
