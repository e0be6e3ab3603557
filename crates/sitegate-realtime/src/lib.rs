//! # sitegate-realtime
//!
//! Live connection hub for SiteGate. Provides:
//!
//! - A single-owner registry of open live connections
//! - A presence count published to every connection on each change
//! - Ping/pong keepalive bookkeeping for idle detection
//! - Admin announcements and forced disconnects
//! - Graceful shutdown that closes every connection

pub mod connection;
pub mod error;
pub mod hub;
pub mod message;
pub mod metrics;

pub use connection::{
    CloseReason, ConnectionId, ConnectionInfo, ConnectionState, HubEvent, Keepalive, LiveConnection,
};
pub use error::RealtimeError;
pub use hub::LiveSessionHub;
pub use message::{InboundMessage, OutboundMessage, PresenceCount};
pub use metrics::HubMetrics;
