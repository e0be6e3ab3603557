//! Double-submit CSRF protection bound to a server-issued cookie.

pub mod guard;

pub use guard::{CsrfGuard, CsrfTokenPair};
