//! Visitor store abstraction and its PostgreSQL implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use sitegate_core::config::{PresenceConfig, VisitorStoreKind};
use sitegate_core::error::AppError;
use sitegate_core::result::AppResult;
use sitegate_database::DatabasePool;
use sitegate_database::repositories::VisitorRepository;
use sitegate_entity::visitor::{VisitorKey, VisitorRecord};

use super::memory::MemoryVisitorStore;

/// Persistent home of visitor records.
///
/// Implementations must make `upsert` atomic per key: concurrent first
/// sightings of one key produce exactly one record and no lost increments.
#[async_trait]
pub trait VisitorStore: Send + Sync + std::fmt::Debug {
    /// Inserts a first sighting or bumps the existing record.
    async fn upsert(&self, key: &VisitorKey, seen_at: DateTime<Utc>) -> AppResult<VisitorRecord>;

    /// Looks up a single record.
    async fn find(&self, key: &VisitorKey) -> AppResult<Option<VisitorRecord>>;

    /// Most recently seen visitors first.
    async fn list_recent(&self, limit: usize) -> AppResult<Vec<VisitorRecord>>;

    /// Number of distinct visitors.
    async fn count(&self) -> AppResult<u64>;
}

#[async_trait]
impl VisitorStore for VisitorRepository {
    async fn upsert(&self, key: &VisitorKey, seen_at: DateTime<Utc>) -> AppResult<VisitorRecord> {
        VisitorRepository::upsert(self, key, seen_at).await
    }

    async fn find(&self, key: &VisitorKey) -> AppResult<Option<VisitorRecord>> {
        VisitorRepository::find(self, key).await
    }

    async fn list_recent(&self, limit: usize) -> AppResult<Vec<VisitorRecord>> {
        VisitorRepository::list_recent(self, i64::try_from(limit).unwrap_or(i64::MAX)).await
    }

    async fn count(&self) -> AppResult<u64> {
        let count = VisitorRepository::count(self).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

/// Selects the store named by configuration.
///
/// The PostgreSQL store needs a pool; asking for it without one is a
/// configuration error.
pub fn build_visitor_store(
    config: &PresenceConfig,
    db: Option<&DatabasePool>,
) -> AppResult<Arc<dyn VisitorStore>> {
    match config.store {
        VisitorStoreKind::Memory => {
            info!("Visitor records kept in memory");
            Ok(Arc::new(MemoryVisitorStore::new()))
        }
        VisitorStoreKind::Postgres => {
            let db = db.ok_or_else(|| {
                AppError::configuration("presence.store = \"postgres\" requires a database pool")
            })?;
            info!("Visitor records kept in PostgreSQL");
            Ok(Arc::new(VisitorRepository::new(db.pool().clone())))
        }
    }
}
