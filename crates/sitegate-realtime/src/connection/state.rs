//! Connection state machine.

use serde::{Deserialize, Serialize};

/// Lifecycle of a live connection.
///
/// States only move forward: `Connecting → Open → Closing → Closed`.
/// A connection may also skip straight to `Closing` or `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Waiting for the hub to admit it.
    Connecting,
    /// Registered and counted.
    Open,
    /// Shutting down; no longer receives hub events.
    Closing,
    /// Removed from the registry.
    Closed,
}

impl ConnectionState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        next > self
    }
}

/// Why a connection was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The client closed the socket or the socket errored.
    ClientClosed,
    /// No frame arrived within the keepalive window.
    IdleTimeout,
    /// An administrator forced the disconnect.
    Disconnected,
    /// The hub is stopping.
    HubShutdown,
}

impl CloseReason {
    /// WebSocket close code sent to the client.
    pub fn close_code(self) -> u16 {
        match self {
            Self::ClientClosed => 1000,
            Self::IdleTimeout => 1001,
            Self::Disconnected => 1008,
            Self::HubShutdown => 1001,
        }
    }

    /// Short human-readable reason.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClientClosed => "client closed",
            Self::IdleTimeout => "idle timeout",
            Self::Disconnected => "disconnected by administrator",
            Self::HubShutdown => "server shutting down",
        }
    }
}
