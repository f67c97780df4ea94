//! Driver account business logic.
//!
//! The registration-code gate itself lives at the handler boundary,
//! where the configured code is available; this service handles the
//! account record.

use anyhow::{Result, bail};
use tracing::{info, instrument};

use crate::auth::{hash_password, verify_password};

use super::models::{Driver, RegisterDriverRequest};
use super::repository::DriverRepository;

/// Service for driver account management.
#[derive(Debug, Clone)]
pub struct DriverService {
    repo: DriverRepository,
}

impl DriverService {
    /// Create a new driver service.
    pub fn new(repo: DriverRepository) -> Self {
        Self { repo }
    }

    /// Register a new driver account with validation.
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: RegisterDriverRequest) -> Result<Driver> {
        let full_name = request.full_name.as_deref().unwrap_or("").trim();
        let email = request.email.as_deref().unwrap_or("").trim();
        let password = request.password.as_deref().unwrap_or("");
        let driver_code = request.driver_code.as_deref().unwrap_or("");

        if full_name.is_empty() || email.is_empty() || password.is_empty() {
            bail!("Full name, email and password are required");
        }

        if !crate::validate::is_valid_email(email) {
            bail!("Invalid email format");
        }

        if password.len() < 6 {
            bail!("Password must be at least 6 characters");
        }

        if !self.repo.is_email_available(email).await? {
            bail!("Email '{}' is already registered", email);
        }

        let password_hash = hash_password(password)?;
        let driver = self
            .repo
            .create(full_name, email, &password_hash, driver_code)
            .await?;

        info!(driver_id = %driver.id, email = %driver.email, "Registered driver");
        Ok(driver)
    }

    /// Get a driver account by email.
    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Driver>> {
        self.repo.get_by_email(email).await
    }

    /// Get a driver account by id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<Driver>> {
        self.repo.get(id).await
    }

    /// Check a plaintext password against the stored hash.
    pub fn check_password(&self, driver: &Driver, password: &str) -> Result<bool> {
        verify_password(password, &driver.password_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn service() -> DriverService {
        let db = Database::in_memory().await.unwrap();
        DriverService::new(DriverRepository::new(db.pool().clone()))
    }

    #[tokio::test]
    async fn test_register_and_fetch() {
        let svc = service().await;
        let driver = svc
            .register(RegisterDriverRequest {
                full_name: Some("Marco Reyes".to_string()),
                email: Some("marco@buses.example".to_string()),
                password: Some("wheels-up".to_string()),
                driver_code: Some("ROUTE-7".to_string()),
            })
            .await
            .unwrap();

        assert!(driver.id.starts_with("drv_"));
        let fetched = svc.get(&driver.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "marco@buses.example");
        assert!(svc.check_password(&fetched, "wheels-up").unwrap());
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let svc = service().await;
        let err = svc
            .register(RegisterDriverRequest {
                full_name: Some("Marco Reyes".to_string()),
                email: Some("marco@buses.example".to_string()),
                password: Some("abc".to_string()),
                driver_code: Some("ROUTE-7".to_string()),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("at least 6"));
    }
}
