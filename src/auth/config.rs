//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Token lifetime: 24 hours.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT secret for HS256. Supports `env:VAR_NAME` indirection.
    pub jwt_secret: Option<String>,

    /// Registration code drivers must present at signup.
    /// Must be configured; there is no built-in fallback.
    pub driver_code: Option<String>,

    /// Allowed CORS origins for the REST surface and the WebSocket path.
    pub allowed_origins: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            driver_code: None,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8080".to_string(),
            ],
        }
    }
}

impl AuthConfig {
    /// Resolve the JWT secret, expanding `env:VAR_NAME` syntax.
    pub fn resolve_jwt_secret(&self) -> Result<Option<String>, ConfigValidationError> {
        match &self.jwt_secret {
            None => Ok(None),
            Some(value) => {
                if let Some(var_name) = value.strip_prefix("env:") {
                    match std::env::var(var_name) {
                        Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
                        Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                        Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
                    }
                } else {
                    Ok(Some(value.clone()))
                }
            }
        }
    }

    /// Validate the configuration before serving.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let secret = self
            .resolve_jwt_secret()?
            .ok_or(ConfigValidationError::MissingJwtSecret)?;

        if secret.len() < 32 {
            return Err(ConfigValidationError::JwtSecretTooShort);
        }

        if self.driver_code.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigValidationError::MissingDriverCode);
        }

        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("auth.jwt_secret is required")]
    MissingJwtSecret,

    #[error("auth.jwt_secret must be at least 32 characters")]
    JwtSecretTooShort,

    #[error("auth.driver_code is required")]
    MissingDriverCode,

    #[error("environment variable {0} referenced by auth.jwt_secret is not set")]
    EnvVarNotFound(String),

    #[error("environment variable {0} referenced by auth.jwt_secret is empty")]
    EnvVarEmpty(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: Some("a-test-secret-that-is-long-enough-to-pass".to_string()),
            driver_code: Some("ROUTE-7".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_secret() {
        let config = AuthConfig {
            jwt_secret: None,
            ..valid_config()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::MissingJwtSecret)
        );
    }

    #[test]
    fn test_validate_short_secret() {
        let config = AuthConfig {
            jwt_secret: Some("short".to_string()),
            ..valid_config()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::JwtSecretTooShort)
        );
    }

    #[test]
    fn test_validate_missing_driver_code() {
        let config = AuthConfig {
            driver_code: None,
            ..valid_config()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::MissingDriverCode)
        );
    }

    #[test]
    fn test_env_indirection_missing_var() {
        let config = AuthConfig {
            jwt_secret: Some("env:TRACKIFY_TEST_NO_SUCH_VAR".to_string()),
            ..valid_config()
        };
        assert!(matches!(
            config.resolve_jwt_secret(),
            Err(ConfigValidationError::EnvVarNotFound(_))
        ));
    }
}
