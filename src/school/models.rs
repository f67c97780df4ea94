//! School account models.

use serde::{Deserialize, Serialize};

/// A school administrator account.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: String,
    pub school_name: String,
    pub admin_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub created_at: String,
    #[serde(skip_serializing)]
    pub updated_at: String,
}

/// Registration request for a school account.
///
/// Fields are optional so presence can be validated with a 400 instead
/// of a body-deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSchoolRequest {
    pub school_name: Option<String>,
    pub admin_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}
