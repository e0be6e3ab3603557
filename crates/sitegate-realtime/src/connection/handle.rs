//! Handle to a single live connection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::hub::HubCommand;
use crate::message::types::{OutboundMessage, PresenceCount};

use super::state::{CloseReason, ConnectionState};

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// Snapshot of connection info (serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Connection ID
    pub id: ConnectionId,
    /// Remote address as reported by the transport
    pub peer: Option<String>,
    /// Connected at
    pub connected_at: DateTime<Utc>,
}

/// Something the connection task should forward to its client.
#[derive(Debug, Clone, PartialEq)]
pub enum HubEvent {
    /// The live count changed.
    Count(PresenceCount),
    /// A message addressed to this connection.
    Message(OutboundMessage),
    /// The hub closed this connection.
    Closed(CloseReason),
}

/// A connection admitted by the [`LiveSessionHub`](crate::hub::LiveSessionHub).
///
/// The hub owns the registry entry; this handle is what the connection task
/// holds. Dropping it (or calling [`leave`](Self::leave)) removes the entry.
/// Removal is idempotent.
#[derive(Debug)]
pub struct LiveConnection {
    info: ConnectionInfo,
    state: ConnectionState,
    commands: mpsc::UnboundedSender<HubCommand>,
    outbound: mpsc::Receiver<OutboundMessage>,
    count: watch::Receiver<PresenceCount>,
    cancel: CancellationToken,
    hub_shutdown: CancellationToken,
}

impl LiveConnection {
    pub(crate) fn new(
        info: ConnectionInfo,
        commands: mpsc::UnboundedSender<HubCommand>,
        outbound: mpsc::Receiver<OutboundMessage>,
        count: watch::Receiver<PresenceCount>,
        cancel: CancellationToken,
        hub_shutdown: CancellationToken,
    ) -> Self {
        Self {
            info,
            state: ConnectionState::Connecting,
            commands,
            outbound,
            count,
            cancel,
            hub_shutdown,
        }
    }

    /// Connection ID
    pub fn id(&self) -> ConnectionId {
        self.info.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Serializable snapshot
    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    pub(crate) fn transition(&mut self, next: ConnectionState) {
        if self.state.can_transition_to(next) {
            self.state = next;
        }
    }

    /// Latest published count, marking it as seen.
    pub fn current_count(&mut self) -> PresenceCount {
        *self.count.borrow_and_update()
    }

    /// Waits for the next thing to forward to the client.
    ///
    /// Cancel-safe, so it can sit in a `select!` next to socket reads and
    /// the keepalive ticker. Count changes may be coalesced; the value
    /// delivered is always the latest.
    pub async fn next_event(&mut self) -> HubEvent {
        if self.state >= ConnectionState::Closing {
            return HubEvent::Closed(self.close_reason());
        }

        let event = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => HubEvent::Closed(self.close_reason()),
            changed = self.count.changed() => match changed {
                Ok(()) => HubEvent::Count(*self.count.borrow_and_update()),
                Err(_) => HubEvent::Closed(CloseReason::HubShutdown),
            },
            message = self.outbound.recv() => match message {
                Some(message) => HubEvent::Message(message),
                None => HubEvent::Closed(CloseReason::Disconnected),
            },
        };

        if matches!(event, HubEvent::Closed(_)) {
            self.transition(ConnectionState::Closing);
        }
        event
    }

    /// Marks the connection as closing; it receives no further hub events.
    pub fn begin_close(&mut self) {
        self.transition(ConnectionState::Closing);
    }

    /// Removes the connection from the hub and waits until the new count
    /// has been published.
    pub async fn leave(mut self) {
        let (ack, done) = oneshot::channel();
        if self
            .commands
            .send(HubCommand::Leave {
                id: self.info.id,
                ack: Some(ack),
            })
            .is_ok()
        {
            let _ = done.await;
        }
        self.transition(ConnectionState::Closed);
    }

    fn close_reason(&self) -> CloseReason {
        if self.hub_shutdown.is_cancelled() {
            CloseReason::HubShutdown
        } else {
            CloseReason::Disconnected
        }
    }
}

impl Drop for LiveConnection {
    fn drop(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.state = ConnectionState::Closed;
        if self
            .commands
            .send(HubCommand::Leave {
                id: self.info.id,
                ack: None,
            })
            .is_err()
        {
            debug!(conn_id = %self.info.id, "Hub already stopped; nothing to leave");
        }
    }
}
