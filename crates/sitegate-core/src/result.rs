//! Convenience result type alias for SiteGate.

use crate::error::AppError;

/// A specialized `Result` type for SiteGate operations.
pub type AppResult<T> = Result<T, AppError>;
