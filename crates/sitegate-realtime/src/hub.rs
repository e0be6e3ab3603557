//! The live session hub: a single task that owns the connection registry.
//!
//! Every mutation (join, leave, disconnect) is a command on one unbounded
//! channel, so the registry is only ever touched by the actor and no
//! removal is lost. After each mutation the actor publishes the new
//! [`PresenceCount`] on a `watch` channel; each connection observes the
//! latest value, possibly skipping intermediate ones.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use sitegate_core::config::RealtimeConfig;

use crate::connection::handle::{ConnectionId, ConnectionInfo, LiveConnection};
use crate::connection::state::ConnectionState;
use crate::error::RealtimeError;
use crate::message::types::{OutboundMessage, PresenceCount};
use crate::metrics::HubMetrics;

/// Per-connection outbound queue depth.
const OUTBOUND_BUFFER: usize = 32;

/// Requests handled by the hub task.
#[derive(Debug)]
pub(crate) enum HubCommand {
    Join {
        entry: Entry,
        reply: oneshot::Sender<Result<(), RealtimeError>>,
    },
    Leave {
        id: ConnectionId,
        ack: Option<oneshot::Sender<()>>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<ConnectionInfo>>,
    },
    Announce {
        message: OutboundMessage,
        reply: oneshot::Sender<usize>,
    },
    Disconnect {
        id: ConnectionId,
        reply: oneshot::Sender<bool>,
    },
}

/// Registry entry owned by the hub task.
#[derive(Debug)]
pub(crate) struct Entry {
    info: ConnectionInfo,
    outbound: mpsc::Sender<OutboundMessage>,
    cancel: CancellationToken,
}

/// Cloneable handle to the live session hub.
#[derive(Debug, Clone)]
pub struct LiveSessionHub {
    commands: mpsc::UnboundedSender<HubCommand>,
    count: watch::Receiver<PresenceCount>,
    shutdown: CancellationToken,
    metrics: Arc<HubMetrics>,
    config: RealtimeConfig,
}

impl LiveSessionHub {
    /// Spawns the hub task. Must be called inside a Tokio runtime.
    pub fn start(config: &RealtimeConfig) -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();
        let (count_tx, count) = watch::channel(PresenceCount::default());
        let shutdown = CancellationToken::new();

        let actor = HubActor {
            registry: HashMap::new(),
            inbox,
            count: count_tx,
            shutdown: shutdown.clone(),
            max_connections: config.max_connections,
        };
        tokio::spawn(actor.run());

        info!(
            max_connections = config.max_connections,
            ping_interval_seconds = config.ping_interval_seconds,
            "Live session hub started"
        );

        Self {
            commands,
            count,
            shutdown,
            metrics: Arc::new(HubMetrics::new()),
            config: config.clone(),
        }
    }

    /// Registers a new connection and returns it in the `Open` state.
    pub async fn join(&self, peer: Option<String>) -> Result<LiveConnection, RealtimeError> {
        if self.shutdown.is_cancelled() {
            self.metrics.connection_rejected();
            return Err(RealtimeError::ShuttingDown);
        }

        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER);
        let cancel = self.shutdown.child_token();
        let info = ConnectionInfo {
            id: Uuid::new_v4(),
            peer,
            connected_at: Utc::now(),
        };

        let mut connection = LiveConnection::new(
            info.clone(),
            self.commands.clone(),
            outbound_rx,
            self.count.clone(),
            cancel.clone(),
            self.shutdown.clone(),
        );

        let (reply, admitted) = oneshot::channel();
        let entry = Entry {
            info,
            outbound: outbound_tx,
            cancel,
        };

        let result = match self.commands.send(HubCommand::Join { entry, reply }) {
            Ok(()) => admitted.await.unwrap_or(Err(RealtimeError::ShuttingDown)),
            Err(_) => Err(RealtimeError::ShuttingDown),
        };

        match result {
            Ok(()) => {
                connection.transition(ConnectionState::Open);
                self.metrics.connection_opened();
                Ok(connection)
            }
            Err(e) => {
                connection.transition(ConnectionState::Closed);
                self.metrics.connection_rejected();
                Err(e)
            }
        }
    }

    /// Latest published count.
    pub fn count(&self) -> PresenceCount {
        *self.count.borrow()
    }

    /// Receiver that observes every published count.
    pub fn subscribe(&self) -> watch::Receiver<PresenceCount> {
        self.count.clone()
    }

    /// Open connections, oldest first.
    pub async fn snapshot(&self) -> Vec<ConnectionInfo> {
        let (reply, rx) = oneshot::channel();
        if self.commands.send(HubCommand::Snapshot { reply }).is_err() {
            return Vec::new();
        }
        let mut connections = rx.await.unwrap_or_default();
        connections.sort_by_key(|c| c.connected_at);
        connections
    }

    /// Queues a message to every open connection. Returns how many accepted it.
    pub async fn announce(&self, message: OutboundMessage) -> usize {
        let (reply, rx) = oneshot::channel();
        if self
            .commands
            .send(HubCommand::Announce { message, reply })
            .is_err()
        {
            return 0;
        }
        let delivered = rx.await.unwrap_or(0);
        self.metrics.announcements_sent(delivered as u64);
        delivered
    }

    /// Force-closes one connection. Returns `false` if it was not open.
    pub async fn disconnect(&self, id: ConnectionId) -> bool {
        let (reply, rx) = oneshot::channel();
        if self
            .commands
            .send(HubCommand::Disconnect { id, reply })
            .is_err()
        {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// Closes every connection, clears the registry, and publishes a count of 0.
    pub async fn shutdown(&self) {
        info!("Shutting down live session hub");
        self.shutdown.cancel();
        let mut count = self.count.clone();
        let _ = count.wait_for(|c| c.count == 0).await;
        info!("Live session hub shut down");
    }

    /// Whether [`shutdown`](Self::shutdown) has been requested.
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Hub counters.
    pub fn metrics(&self) -> &Arc<HubMetrics> {
        &self.metrics
    }

    /// Hub configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }
}

/// The single owner of the registry.
struct HubActor {
    registry: HashMap<ConnectionId, Entry>,
    inbox: mpsc::UnboundedReceiver<HubCommand>,
    count: watch::Sender<PresenceCount>,
    shutdown: CancellationToken,
    max_connections: usize,
}

impl HubActor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                command = self.inbox.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            }
        }

        let closed = self.registry.len();
        for entry in self.registry.values() {
            entry.cancel.cancel();
        }
        self.registry.clear();
        self.publish();
        info!(closed, "Live connections closed");
    }

    fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Join { entry, reply } => {
                let result = self.admit(entry);
                let _ = reply.send(result);
            }
            HubCommand::Leave { id, ack } => {
                if self.registry.remove(&id).is_some() {
                    debug!(conn_id = %id, "Live connection left");
                    self.publish();
                }
                if let Some(ack) = ack {
                    let _ = ack.send(());
                }
            }
            HubCommand::Snapshot { reply } => {
                let _ = reply.send(self.registry.values().map(|e| e.info.clone()).collect());
            }
            HubCommand::Announce { message, reply } => {
                let _ = reply.send(self.announce(&message));
            }
            HubCommand::Disconnect { id, reply } => {
                let removed = match self.registry.remove(&id) {
                    Some(entry) => {
                        entry.cancel.cancel();
                        info!(conn_id = %id, "Live connection disconnected by administrator");
                        self.publish();
                        true
                    }
                    None => false,
                };
                let _ = reply.send(removed);
            }
        }
    }

    fn admit(&mut self, entry: Entry) -> Result<(), RealtimeError> {
        if self.shutdown.is_cancelled() {
            return Err(RealtimeError::ShuttingDown);
        }
        if self.max_connections > 0 && self.registry.len() >= self.max_connections {
            warn!(
                max = self.max_connections,
                "Live hub at capacity, rejecting connection"
            );
            return Err(RealtimeError::AtCapacity {
                max: self.max_connections,
            });
        }

        debug!(conn_id = %entry.info.id, "Live connection joined");
        self.registry.insert(entry.info.id, entry);
        self.publish();
        Ok(())
    }

    fn announce(&self, message: &OutboundMessage) -> usize {
        let mut delivered = 0;
        for (id, entry) in &self.registry {
            match entry.outbound.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(conn_id = %id, "Connection send buffer full, dropping message");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(conn_id = %id, "Connection already gone");
                }
            }
        }
        delivered
    }

    fn publish(&self) {
        let count = self.registry.len();
        self.count.send_if_modified(|current| {
            if current.count == count {
                return false;
            }
            current.count = count;
            true
        });
    }
}
