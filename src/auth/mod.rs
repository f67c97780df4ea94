//! Authentication module.
//!
//! HS256 JWT issuance and validation, per-role claims, and the axum
//! middleware/extractors protecting the management routes.

mod claims;
mod config;
mod error;
mod middleware;
mod password;

pub(crate) use password::{hash_password, verify_password};

pub use claims::{Claims, Role};
pub use config::{AuthConfig, ConfigValidationError, TOKEN_TTL_SECS};
pub use error::AuthError;
pub use middleware::{AuthState, CurrentUser, RequireSchool, auth_middleware};
