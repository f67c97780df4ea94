//! Parent repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::Parent;

/// Repository for parent account database operations.
#[derive(Debug, Clone)]
pub struct ParentRepository {
    pool: SqlitePool,
}

impl ParentRepository {
    /// Create a new parent repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn generate_id() -> String {
        format!("par_{}", nanoid::nanoid!(12))
    }

    /// Insert a new parent account.
    #[instrument(skip(self, password_hash))]
    pub async fn create(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
        student_code: Option<&str>,
    ) -> Result<Parent> {
        let id = Self::generate_id();
        debug!("Creating parent account: {} ({})", email, id);

        sqlx::query(
            r#"
            INSERT INTO parents (id, full_name, email, password_hash, student_code)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .bind(student_code)
        .execute(&self.pool)
        .await
        .context("Failed to insert parent")?;

        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Parent not found after creation"))
    }

    /// Get a parent by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<Parent>> {
        let parent = sqlx::query_as::<_, Parent>(
            r#"
            SELECT id, full_name, email, password_hash, student_code, created_at, updated_at
            FROM parents
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch parent")?;

        Ok(parent)
    }

    /// Get a parent by email.
    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Parent>> {
        let parent = sqlx::query_as::<_, Parent>(
            r#"
            SELECT id, full_name, email, password_hash, student_code, created_at, updated_at
            FROM parents
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch parent by email")?;

        Ok(parent)
    }

    /// Check if an email is available.
    #[instrument(skip(self))]
    pub async fn is_email_available(&self, email: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM parents WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check email availability")?;

        Ok(count.0 == 0)
    }
}
