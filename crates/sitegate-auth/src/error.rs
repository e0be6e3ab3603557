//! Typed authorization failures.
//!
//! Each variant maps to a stable code so clients can tell "log in again"
//! (authentication) from "not allowed" (access) from "refresh and retry"
//! (CSRF).

use thiserror::Error;

use sitegate_core::error::AppError;

/// Bearer token authentication failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization: Bearer <token>` header.
    #[error("No authorization token was found")]
    CredentialMissing,
    /// Token signature is valid but the token has expired.
    #[error("Token has expired")]
    CredentialExpired,
    /// Token is malformed or its signature does not verify.
    #[error("Token is invalid")]
    CredentialInvalid,
}

impl AuthError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CredentialMissing => "CREDENTIAL_MISSING",
            Self::CredentialExpired => "CREDENTIAL_EXPIRED",
            Self::CredentialInvalid => "CREDENTIAL_INVALID",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::authentication(err.to_string()).with_code(err.code())
    }
}

/// Role guard failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The guard ran without a prior successful authentication.
    #[error("No authenticated identity")]
    NoIdentity,
    /// The identity's role is not in the allowed set.
    #[error("Insufficient role for this resource")]
    RoleForbidden,
}

impl AccessError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoIdentity => "NO_IDENTITY",
            Self::RoleForbidden => "ROLE_FORBIDDEN",
        }
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        AppError::authorization(err.to_string()).with_code(err.code())
    }
}

/// Code shared by every CSRF failure, as expected by existing clients.
pub const CSRF_ERROR_CODE: &str = "EBADCSRFTOKEN";

/// Double-submit validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CsrfError {
    /// The cookie or the echoed value is absent.
    #[error("CSRF token missing")]
    TokenMissing,
    /// The echoed value was not issued for this cookie.
    #[error("invalid csrf token")]
    TokenMismatch,
}

impl From<CsrfError> for AppError {
    fn from(err: CsrfError) -> Self {
        AppError::csrf(err.to_string()).with_code(CSRF_ERROR_CODE)
    }
}
