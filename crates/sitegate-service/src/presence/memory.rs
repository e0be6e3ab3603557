//! In-memory visitor store for single-node deployments and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use sitegate_core::result::AppResult;
use sitegate_entity::visitor::{VisitorKey, VisitorRecord};

use super::store::VisitorStore;

/// Visitor store backed by a sharded concurrent map.
///
/// `upsert` runs under the shard's write lock via the entry API, which
/// serializes concurrent writers of the same key.
#[derive(Debug, Default)]
pub struct MemoryVisitorStore {
    records: DashMap<VisitorKey, VisitorRecord>,
}

impl MemoryVisitorStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VisitorStore for MemoryVisitorStore {
    async fn upsert(&self, key: &VisitorKey, seen_at: DateTime<Utc>) -> AppResult<VisitorRecord> {
        let record = self
            .records
            .entry(key.clone())
            .and_modify(|existing| existing.record_sighting(seen_at))
            .or_insert_with(|| VisitorRecord::first_sighting(key, seen_at))
            .value()
            .clone();
        Ok(record)
    }

    async fn find(&self, key: &VisitorKey) -> AppResult<Option<VisitorRecord>> {
        Ok(self.records.get(key).map(|r| r.value().clone()))
    }

    async fn list_recent(&self, limit: usize) -> AppResult<Vec<VisitorRecord>> {
        let mut all: Vec<VisitorRecord> = self.records.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        all.truncate(limit);
        Ok(all)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.records.len() as u64)
    }
}
