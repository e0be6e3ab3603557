//! Live hub metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Hub-level counters.
#[derive(Debug, Default)]
pub struct HubMetrics {
    /// Connections ever admitted
    pub connections_total: AtomicU64,
    /// Joins refused because the hub was full or stopping
    pub connections_rejected: AtomicU64,
    /// Connections closed for silence
    pub idle_timeouts: AtomicU64,
    /// Announcement messages queued to connections
    pub announcements_sent: AtomicU64,
    /// Inbound frames received from clients
    pub messages_received: AtomicU64,
}

impl HubMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_rejected(&self) {
        self.connections_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn idle_timeout(&self) {
        self.idle_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn announcements_sent(&self, delivered: u64) {
        self.announcements_sent.fetch_add(delivered, Ordering::Relaxed);
    }

    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_rejected: self.connections_rejected.load(Ordering::Relaxed),
            idle_timeouts: self.idle_timeouts.load(Ordering::Relaxed),
            announcements_sent: self.announcements_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever admitted
    pub connections_total: u64,
    /// Joins refused
    pub connections_rejected: u64,
    /// Connections closed for silence
    pub idle_timeouts: u64,
    /// Announcement messages queued
    pub announcements_sent: u64,
    /// Inbound frames received
    pub messages_received: u64,
}
