//! Driver repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::Driver;

/// Repository for driver account database operations.
#[derive(Debug, Clone)]
pub struct DriverRepository {
    pool: SqlitePool,
}

impl DriverRepository {
    /// Create a new driver repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn generate_id() -> String {
        format!("drv_{}", nanoid::nanoid!(12))
    }

    /// Insert a new driver account.
    #[instrument(skip(self, password_hash))]
    pub async fn create(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
        driver_code: &str,
    ) -> Result<Driver> {
        let id = Self::generate_id();
        debug!("Creating driver account: {} ({})", email, id);

        sqlx::query(
            r#"
            INSERT INTO drivers (id, full_name, email, password_hash, driver_code)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .bind(driver_code)
        .execute(&self.pool)
        .await
        .context("Failed to insert driver")?;

        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Driver not found after creation"))
    }

    /// Get a driver by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            SELECT id, full_name, email, password_hash, driver_code, created_at, updated_at
            FROM drivers
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch driver")?;

        Ok(driver)
    }

    /// Get a driver by email.
    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            SELECT id, full_name, email, password_hash, driver_code, created_at, updated_at
            FROM drivers
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch driver by email")?;

        Ok(driver)
    }

    /// Check if an email is available.
    #[instrument(skip(self))]
    pub async fn is_email_available(&self, email: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM drivers WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check email availability")?;

        Ok(count.0 == 0)
    }
}
