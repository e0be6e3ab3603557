//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles carried in bearer tokens.
///
/// Access checks are membership tests against an allowed set; roles are
/// deliberately not ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Site administrator.
    Admin,
    /// Editorial staff.
    Staff,
    /// Authenticated account without back-office rights.
    Guest,
}

impl Role {
    /// All known roles.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Staff, Role::Guest];

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Guest => "guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = sitegate_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "guest" => Ok(Self::Guest),
            _ => Err(sitegate_core::AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: admin, staff, guest"
            ))),
        }
    }
}
