//! Inbound and outbound live message type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of currently open live connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceCount {
    /// Open connections.
    pub count: usize,
}

/// Messages sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Application-level keepalive.
    Ping,
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Live presence count.
    PresenceCount {
        /// Open connections.
        count: usize,
    },
    /// Admin announcement.
    Announcement {
        /// Announcement ID.
        id: Uuid,
        /// Title.
        title: String,
        /// Message body.
        message: String,
        /// Severity level.
        severity: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
    /// Reply to an application-level ping.
    Pong {
        /// Server timestamp (unix millis).
        timestamp: i64,
    },
    /// Error message.
    Error {
        /// Error code.
        code: String,
        /// Error description.
        message: String,
    },
}

impl From<PresenceCount> for OutboundMessage {
    fn from(value: PresenceCount) -> Self {
        Self::PresenceCount { count: value.count }
    }
}

impl OutboundMessage {
    /// Builds an announcement stamped now.
    pub fn announcement(
        title: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self::Announcement {
            id: Uuid::new_v4(),
            title: title.into(),
            message: message.into(),
            severity: severity.into(),
            timestamp: Utc::now(),
        }
    }

    /// Builds a pong stamped now.
    pub fn pong() -> Self {
        Self::Pong {
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}
