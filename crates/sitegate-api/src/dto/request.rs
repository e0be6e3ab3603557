//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use sitegate_core::error::AppError;

/// Severities an announcement may carry.
const SEVERITIES: [&str; 3] = ["info", "warning", "critical"];

/// Admin announcement pushed to every live connection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BroadcastRequest {
    /// Title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Message body.
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    /// Severity: info, warning or critical.
    #[serde(default = "default_severity")]
    #[validate(custom(function = "validate_severity"))]
    pub severity: String,
}

fn default_severity() -> String {
    "info".to_string()
}

fn validate_severity(severity: &str) -> Result<(), ValidationError> {
    if SEVERITIES.contains(&severity) {
        Ok(())
    } else {
        Err(ValidationError::new("severity"))
    }
}

/// Query for the visitor listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct VisitorListQuery {
    /// Maximum records to return (default 50).
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<usize>,
}

impl VisitorListQuery {
    /// Effective limit.
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(50)
    }
}

/// Runs `validator` rules and maps failures to a validation error.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request
        .validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}
