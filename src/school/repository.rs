//! School repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::School;

/// Repository for school account database operations.
#[derive(Debug, Clone)]
pub struct SchoolRepository {
    pool: SqlitePool,
}

impl SchoolRepository {
    /// Create a new school repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn generate_id() -> String {
        format!("sch_{}", nanoid::nanoid!(12))
    }

    /// Insert a new school account.
    #[instrument(skip(self, password_hash))]
    pub async fn create(
        &self,
        school_name: &str,
        admin_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<School> {
        let id = Self::generate_id();
        debug!("Creating school account: {} ({})", email, id);

        sqlx::query(
            r#"
            INSERT INTO schools (id, school_name, admin_name, email, password_hash)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(school_name)
        .bind(admin_name)
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .context("Failed to insert school")?;

        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("School not found after creation"))
    }

    /// Get a school by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<School>> {
        let school = sqlx::query_as::<_, School>(
            r#"
            SELECT id, school_name, admin_name, email, password_hash, created_at, updated_at
            FROM schools
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch school")?;

        Ok(school)
    }

    /// Get a school by email.
    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<School>> {
        let school = sqlx::query_as::<_, School>(
            r#"
            SELECT id, school_name, admin_name, email, password_hash, created_at, updated_at
            FROM schools
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch school by email")?;

        Ok(school)
    }

    /// Check if an email is available.
    #[instrument(skip(self))]
    pub async fn is_email_available(&self, email: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schools WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check email availability")?;

        Ok(count.0 == 0)
    }
}
