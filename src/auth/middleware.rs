//! Token issuance, validation middleware, and request extractors.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::sync::Arc;

use crate::api::ApiError;

use super::claims::{Claims, Role};
use super::config::{AuthConfig, TOKEN_TTL_SECS};
use super::error::AuthError;

/// Shared authentication state: config plus the derived signing keys.
#[derive(Clone)]
pub struct AuthState {
    inner: Arc<AuthStateInner>,
}

struct AuthStateInner {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthState {
    /// Build auth state from a validated config.
    ///
    /// Panics if the config has no resolvable JWT secret; call
    /// `AuthConfig::validate` first.
    pub fn new(config: AuthConfig) -> Self {
        let secret = config
            .resolve_jwt_secret()
            .ok()
            .flatten()
            .expect("AuthConfig must be validated before constructing AuthState");

        Self {
            inner: Arc::new(AuthStateInner {
                encoding_key: EncodingKey::from_secret(secret.as_bytes()),
                decoding_key: DecodingKey::from_secret(secret.as_bytes()),
                config,
            }),
        }
    }

    /// The configured driver registration code.
    pub fn driver_code(&self) -> Option<&str> {
        self.inner.config.driver_code.as_deref()
    }

    /// The configured CORS origin allow-list.
    pub fn allowed_origins(&self) -> &[String] {
        &self.inner.config.allowed_origins
    }

    /// Sign a token for an account.
    pub fn issue_token(&self, account_id: &str, role: Role) -> Result<String, AuthError> {
        let claims = Claims::new(account_id, role, TOKEN_TTL_SECS);
        encode(&Header::default(), &claims, &self.inner.encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Verify a token and return its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.inner.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;
        Ok(data.claims)
    }
}

/// Extract the bearer token from an Authorization header value.
fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)
}

/// Middleware that validates the bearer token and stores the claims
/// in request extensions for downstream extractors.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();
    let token = bearer_token(&parts)?;
    let claims = auth.verify_token(token)?;

    parts.extensions.insert(claims);
    request = Request::from_parts(parts, body);

    Ok(next.run(request).await)
}

/// The authenticated account for the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0.sub
    }

    pub fn role(&self) -> Role {
        self.0.role
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AuthError::MissingAuthHeader.into())
    }
}

/// Extractor that additionally requires the `school` role.
#[derive(Debug, Clone)]
pub struct RequireSchool(pub Claims);

impl RequireSchool {
    /// The authenticated school's id.
    pub fn school_id(&self) -> &str {
        &self.0.sub
    }
}

impl<S> FromRequestParts<S> for RequireSchool
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(claims) = CurrentUser::from_request_parts(parts, state).await?;
        if claims.role != Role::School {
            return Err(AuthError::InsufficientPermissions(
                "school account required".to_string(),
            )
            .into());
        }
        Ok(RequireSchool(claims))
    }
}
