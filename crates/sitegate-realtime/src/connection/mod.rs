//! Live connection lifecycle: handles, state, and keepalive.

pub mod handle;
pub mod heartbeat;
pub mod state;

pub use handle::{ConnectionId, ConnectionInfo, HubEvent, LiveConnection};
pub use heartbeat::Keepalive;
pub use state::{CloseReason, ConnectionState};
