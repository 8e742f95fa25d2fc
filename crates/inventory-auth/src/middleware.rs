//! Access-control gate for Axum
//!
//! [`require_auth`] turns the `Authorization: Bearer <token>` header into an
//! [`AuthUser`] in the request extensions, or rejects the request:
//!
//! | request                               | outcome |
//! |---------------------------------------|---------|
//! | no header                             | 401     |
//! | header without the `Bearer ` scheme   | 401     |
//! | `Bearer ` with no token after it      | 401     |
//! | token fails verification              | 403     |
//! | token verifies                        | next    |
//!
//! [`require_roles`] runs after it and checks the caller's role against the
//! route's [`RoleAllowList`]. [`optional_auth`] attaches an identity when it
//! can and otherwise lets the request through anonymously.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use inventory_db::Role;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{AuthError, TokenError};
use crate::jwt::{Claims, TokenService};

const BEARER_PREFIX: &str = "Bearer ";

/// Authenticated user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

impl TryFrom<&Claims> for AuthUser {
    type Error = TokenError;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        let id = claims.sub.parse().map_err(|_| TokenError::Malformed)?;
        let role = Role::from_id(claims.id_rol).ok_or(TokenError::Malformed)?;
        Ok(Self { id, role })
    }
}

/// Extract and verify the bearer token carried by a request
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthUser, AuthError> {
    let header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingAuthHeader)?;
    let header = header.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;

    let rest = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::InvalidAuthHeader)?;
    let token = rest.split(' ').next().unwrap_or_default();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(tokens.verify(token)?)
}

/// Authentication middleware
///
/// Rejects the request unless it carries a valid bearer token; on success
/// the [`AuthUser`] is added to the request extensions.
pub async fn require_auth(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = authenticate(request.headers(), &tokens).inspect_err(|e| {
        if let AuthError::Token(reason) = e {
            warn!("Rejected bearer token: {}", reason);
        }
    })?;

    debug!("Authenticated user: {} ({})", user.id, user.role.as_str());

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Optional authentication middleware
///
/// Like [`require_auth`], but a missing or bad token never rejects the
/// request; it simply proceeds without an [`AuthUser`].
pub async fn optional_auth(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &tokens) {
        Ok(user) => {
            debug!("Identified caller: {} ({})", user.id, user.role.as_str());
            request.extensions_mut().insert(user);
        }
        Err(AuthError::MissingAuthHeader) => {}
        Err(e) => debug!("Ignoring unusable credentials: {}", e),
    }

    next.run(request).await
}

/// Roles permitted to call a route
///
/// Declared next to the route it guards and enforced by [`require_roles`].
#[derive(Debug, Clone, Copy)]
pub struct RoleAllowList(&'static [Role]);

impl RoleAllowList {
    pub const fn new(roles: &'static [Role]) -> Self {
        Self(roles)
    }

    pub fn permits(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn roles(&self) -> &'static [Role] {
        self.0
    }
}

/// Middleware to require one of the roles in the allow-list
///
/// Must be layered inside [`require_auth`].
pub async fn require_roles(
    State(allowed): State<RoleAllowList>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuthHeader)?;

    if !allowed.permits(user.role) {
        warn!(
            "User {} with role {} denied; route requires one of {:?}",
            user.id,
            user.role.as_str(),
            allowed.roles()
        );
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthUser>().copied())
    }
}
