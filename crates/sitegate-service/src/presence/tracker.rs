//! Fire-and-forget visitor recording.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use sitegate_core::config::PresenceConfig;
use sitegate_core::error::AppError;
use sitegate_core::result::AppResult;
use sitegate_entity::visitor::{VisitorKey, VisitorRecord};

use super::sighting::PathFilter;
use super::store::VisitorStore;

/// Records page views against a [`VisitorStore`].
///
/// Recording never fails or delays the request that triggered it: the
/// write runs on a detached task bounded by the store timeout, and every
/// failure is logged and dropped.
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    store: Arc<dyn VisitorStore>,
    filter: PathFilter,
    store_timeout: Duration,
    enabled: bool,
}

impl PresenceTracker {
    /// Creates a tracker over `store`.
    pub fn new(config: &PresenceConfig, store: Arc<dyn VisitorStore>) -> Self {
        Self {
            store,
            filter: PathFilter::from_config(config),
            store_timeout: Duration::from_millis(config.store_timeout_ms),
            enabled: config.enabled,
        }
    }

    /// Whether a request for `path` should be recorded.
    pub fn should_track(&self, path: &str) -> bool {
        self.enabled && self.filter.should_track(path)
    }

    /// Records a sighting in the background.
    ///
    /// The returned handle may be dropped; the write still completes even
    /// if the client that triggered it has gone away.
    pub fn record(&self, key: VisitorKey) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            match tracker.record_now(&key).await {
                Ok(record) => debug!(
                    origin = %record.origin_id,
                    visit_count = record.visit_count,
                    "Visitor recorded"
                ),
                Err(e) => warn!(error = %e, "Visitor tracking failed; ignoring"),
            }
        })
    }

    /// Records a sighting and waits for the store, bounded by the timeout.
    pub async fn record_now(&self, key: &VisitorKey) -> AppResult<VisitorRecord> {
        tokio::time::timeout(self.store_timeout, self.store.upsert(key, Utc::now()))
            .await
            .map_err(|_| {
                AppError::timeout(format!(
                    "Visitor store did not answer within {}ms",
                    self.store_timeout.as_millis()
                ))
            })?
    }

    /// Looks up the record for a key.
    pub async fn lookup(&self, key: &VisitorKey) -> AppResult<Option<VisitorRecord>> {
        self.store.find(key).await
    }

    /// Most recently seen visitors first.
    pub async fn list_recent(&self, limit: usize) -> AppResult<Vec<VisitorRecord>> {
        self.store.list_recent(limit).await
    }

    /// Number of distinct visitors.
    pub async fn total(&self) -> AppResult<u64> {
        self.store.count().await
    }
}
