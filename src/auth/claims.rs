//! JWT claims and account roles.

use serde::{Deserialize, Serialize};

/// Account role carried in every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// School administrator.
    School,
    /// Bus driver.
    Driver,
    /// Parent of one or more students.
    Parent,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::School => write!(f, "school"),
            Role::Driver => write!(f, "driver"),
            Role::Parent => write!(f, "parent"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "school" => Ok(Role::School),
            "driver" => Ok(Role::Driver),
            "parent" => Ok(Role::Parent),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID).
    pub sub: String,

    /// Account role.
    pub role: Role,

    /// Issued at (as Unix timestamp).
    pub iat: i64,

    /// Expiration time (as Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Build claims for an account, valid for `ttl_secs` from now.
    pub fn new(sub: impl Into<String>, role: Role, ttl_secs: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: sub.into(),
            role,
            iat: now,
            exp: now + ttl_secs,
        }
    }
}
