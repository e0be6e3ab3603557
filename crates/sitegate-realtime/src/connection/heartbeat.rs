//! Ping/pong keepalive bookkeeping.

use std::time::Duration;

use tokio::time::Instant;

use sitegate_core::config::RealtimeConfig;

/// Liveness tracker for one connection.
///
/// Owned by the connection task, so it disappears with the connection and
/// never outlives the client.
#[derive(Debug, Clone)]
pub struct Keepalive {
    /// Interval between server pings
    pub ping_interval: Duration,
    /// Grace after a missed ping before the connection is dead
    pub ping_timeout: Duration,
    last_seen: Instant,
}

impl Keepalive {
    /// Starts tracking from now.
    pub fn new(ping_interval: Duration, ping_timeout: Duration) -> Self {
        Self {
            ping_interval,
            ping_timeout,
            last_seen: Instant::now(),
        }
    }

    /// Builds a tracker from hub configuration.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self::new(
            Duration::from_secs(config.ping_interval_seconds.max(1)),
            Duration::from_secs(config.ping_timeout_seconds),
        )
    }

    /// Any inbound frame counts as proof of life.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Instant after which the connection is considered dead.
    pub fn deadline(&self) -> Instant {
        self.last_seen + self.ping_interval + self.ping_timeout
    }

    /// Ticker for outgoing pings; the first tick fires after one interval.
    pub fn ticker(&self) -> tokio::time::Interval {
        let mut interval =
            tokio::time::interval_at(Instant::now() + self.ping_interval, self.ping_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        interval
    }
}
