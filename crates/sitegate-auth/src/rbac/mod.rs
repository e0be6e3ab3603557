//! Role-based access control layered on top of authentication.

pub mod enforcer;

pub use enforcer::AccessGuard;
