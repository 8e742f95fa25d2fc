//! JWT token management

use chrono::{DateTime, Duration, Utc};
use inventory_db::Role;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AuthError, TokenError};
use crate::middleware::AuthUser;

/// Bearer token lifetime
pub const TOKEN_TTL_HOURS: i64 = 24;
/// Longest configurable token lifetime
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Role id, as stored in the `roles` table
    pub id_rol: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Not before (Unix timestamp); never set by this issuer but honored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

/// Signs and verifies bearer tokens with a process-wide HS256 secret
///
/// Tokens are stateless: once issued they stay valid until they expire.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from the signing secret
    ///
    /// An empty secret or a lifetime outside `1..=MAX_TOKEN_TTL_HOURS` is a
    /// configuration error.
    pub fn new(secret: &str, ttl_hours: i64) -> Result<Self, AuthError> {
        if secret.trim().is_empty() {
            return Err(AuthError::MissingSecret);
        }
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&ttl_hours) {
            return Err(AuthError::InvalidTokenTtl(ttl_hours));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::hours(ttl_hours),
        })
    }

    /// Issue a token for a user
    pub fn issue(&self, user_id: i64, role: Role) -> Result<String, AuthError> {
        self.issue_at(user_id, role, Utc::now())
    }

    fn issue_at(&self, user_id: i64, role: Role, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id.to_string(),
            id_rol: role.id(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            nbf: None,
        };

        debug!("Issuing token for user {} ({})", user_id, role.as_str());

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Verify a token and return the identity it carries
    pub fn verify(&self, token: &str) -> Result<AuthUser, TokenError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::ImmatureSignature => TokenError::NotYetValid,
                    _ => TokenError::Malformed,
                }
            })?;

        AuthUser::try_from(&token_data.claims)
    }
}
