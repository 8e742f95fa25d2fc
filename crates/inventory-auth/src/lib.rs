//! Inventory Authentication and Authorization
//!
//! Password hashing, signed bearer tokens, the request gate that turns a
//! bearer token into an [`AuthUser`], per-route role allow-lists, and the
//! registration/login flows built on top of them.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use error::{AuthError, TokenError};
pub use jwt::{Claims, TokenService, TOKEN_TTL_HOURS};
pub use middleware::{optional_auth, require_auth, require_roles, AuthUser, RoleAllowList};
pub use password::{hash_password, verify_password};
pub use service::{Authenticator, LoginOutcome, Registration};
