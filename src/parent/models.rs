//! Parent account models.

use serde::{Deserialize, Serialize};

/// A parent account.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parent {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Code linking the parent to a student, when provided at signup.
    pub student_code: Option<String>,
    #[serde(skip_serializing)]
    pub created_at: String,
    #[serde(skip_serializing)]
    pub updated_at: String,
}

/// Registration request for a parent account.
///
/// Clients send either `name` or `fullName`; both are accepted and
/// stored as the full name.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterParentRequest {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub student_code: Option<String>,
}

impl RegisterParentRequest {
    /// The display name, from whichever field the client sent.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.name.as_deref())
            .unwrap_or("")
            .trim()
    }
}
