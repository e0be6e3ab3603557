//! # sitegate-auth
//!
//! Request authorization building blocks for SiteGate.
//!
//! ## Modules
//!
//! - `jwt`: bearer token issuing and authentication
//! - `rbac`: role membership guard layered on top of authentication
//! - `csrf`: double-submit token issuing and validation
//! - `error`: typed failures with stable machine-readable codes

pub mod csrf;
pub mod error;
pub mod jwt;
pub mod rbac;

pub use csrf::{CsrfGuard, CsrfTokenPair};
pub use error::{AccessError, AuthError, CsrfError};
pub use jwt::{IdentityClaim, TokenAuthenticator, TokenIssuer};
pub use rbac::AccessGuard;
