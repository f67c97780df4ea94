//! Storage for one-time verification codes.

use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

/// Minutes before a stored code expires.
const OTP_TTL_MINUTES: i64 = 5;

/// Repository for one-time codes, keyed by email address.
#[derive(Debug, Clone)]
pub struct OtpRepository {
    pool: SqlitePool,
}

impl OtpRepository {
    /// Create a new OTP repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Generate a fresh six-digit code for an address and store it,
    /// replacing any previous code for the same address.
    #[instrument(skip(self))]
    pub async fn generate(&self, email: &str) -> Result<String> {
        let code = format!("{}", rand::rng().random_range(100_000..1_000_000));
        let expires_at = (Utc::now() + Duration::minutes(OTP_TTL_MINUTES)).to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO otp_codes (email, code, expires_at)
            VALUES (?, ?, ?)
            ON CONFLICT(email) DO UPDATE SET
                code = excluded.code,
                expires_at = excluded.expires_at,
                created_at = datetime('now')
            "#,
        )
        .bind(email)
        .bind(&code)
        .bind(&expires_at)
        .execute(&self.pool)
        .await
        .context("Failed to store OTP")?;

        debug!("Stored OTP for {}", email);
        Ok(code)
    }

    /// Check a submitted code and consume it on success. A code can be
    /// used at most once.
    #[instrument(skip(self, code))]
    pub async fn verify_and_consume(&self, email: &str, code: &str) -> Result<()> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT code, expires_at FROM otp_codes WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to fetch OTP")?;

        let Some((stored_code, expires_at)) = row else {
            bail!("No OTP found for this email");
        };

        let expired = chrono::DateTime::parse_from_rfc3339(&expires_at)
            .map(|t| t < Utc::now())
            .unwrap_or(true);
        if expired {
            sqlx::query("DELETE FROM otp_codes WHERE email = ?")
                .bind(email)
                .execute(&self.pool)
                .await
                .context("Failed to delete expired OTP")?;
            bail!("OTP expired");
        }

        if stored_code != code {
            bail!("Invalid OTP");
        }

        sqlx::query("DELETE FROM otp_codes WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await
            .context("Failed to consume OTP")?;

        debug!("Consumed OTP for {}", email);
        Ok(())
    }
}
