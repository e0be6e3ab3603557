//! Errors raised when joining the live hub.

use thiserror::Error;

use sitegate_core::error::{AppError, ErrorKind};

/// Reasons a connection could not be admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RealtimeError {
    /// The hub already holds its maximum number of connections.
    #[error("Live hub is full ({max} connections)")]
    AtCapacity {
        /// Configured limit.
        max: usize,
    },
    /// The hub is shutting down or has stopped.
    #[error("Live hub is shutting down")]
    ShuttingDown,
}

impl RealtimeError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AtCapacity { .. } => "HUB_FULL",
            Self::ShuttingDown => "HUB_SHUTTING_DOWN",
        }
    }
}

impl From<RealtimeError> for AppError {
    fn from(err: RealtimeError) -> Self {
        AppError::new(ErrorKind::ServiceUnavailable, err.to_string()).with_code(err.code())
    }
}
