//! Parent account business logic.

use anyhow::{Result, bail};
use tracing::{info, instrument};

use crate::auth::{hash_password, verify_password};

use super::models::{Parent, RegisterParentRequest};
use super::repository::ParentRepository;

/// Service for parent account management.
#[derive(Debug, Clone)]
pub struct ParentService {
    repo: ParentRepository,
}

impl ParentService {
    /// Create a new parent service.
    pub fn new(repo: ParentRepository) -> Self {
        Self { repo }
    }

    /// Register a new parent account with validation.
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: RegisterParentRequest) -> Result<Parent> {
        let full_name = request.display_name().to_string();
        let email = request.email.as_deref().unwrap_or("").trim();
        let password = request.password.as_deref().unwrap_or("");

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
        let parent = self
            .repo
            .create(
                &full_name,
                email,
                &password_hash,
                request.student_code.as_deref(),
            )
            .await?;

        info!(parent_id = %parent.id, email = %parent.email, "Registered parent");
        Ok(parent)
    }

    /// Get a parent account by email.
    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Parent>> {
        self.repo.get_by_email(email).await
    }

    /// Check a plaintext password against the stored hash.
    pub fn check_password(&self, parent: &Parent, password: &str) -> Result<bool> {
        verify_password(password, &parent.password_hash)
    }
}
