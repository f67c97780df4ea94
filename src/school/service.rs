//! School account business logic.

use anyhow::{Result, bail};
use tracing::{info, instrument};

use crate::auth::{hash_password, verify_password};

use super::models::{RegisterSchoolRequest, School};
use super::repository::SchoolRepository;

/// Service for school account management.
#[derive(Debug, Clone)]
pub struct SchoolService {
    repo: SchoolRepository,
}

impl SchoolService {
    /// Create a new school service.
    pub fn new(repo: SchoolRepository) -> Self {
        Self { repo }
    }

    /// Register a new school account with validation.
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: RegisterSchoolRequest) -> Result<School> {
        let school_name = request.school_name.as_deref().unwrap_or("").trim();
        let admin_name = request.admin_name.as_deref().unwrap_or("").trim();
        let email = request.email.as_deref().unwrap_or("").trim();
        let password = request.password.as_deref().unwrap_or("");

        if school_name.is_empty() || admin_name.is_empty() || email.is_empty() || password.is_empty()
        {
            bail!("School name, admin name, email and password are required");
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
        let school = self
            .repo
            .create(school_name, admin_name, email, &password_hash)
            .await?;

        info!(school_id = %school.id, email = %school.email, "Registered school");
        Ok(school)
    }

    /// Get a school account by email.
    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<School>> {
        self.repo.get_by_email(email).await
    }

    /// Check a plaintext password against the stored hash.
    pub fn check_password(&self, school: &School, password: &str) -> Result<bool> {
        verify_password(password, &school.password_hash)
    }
}
