//! Custom Axum extractors.

pub mod auth;
pub mod peer;

pub use auth::AuthIdentity;
pub use peer::PeerAddr;
