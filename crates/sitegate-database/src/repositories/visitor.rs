//! Visitor repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use sitegate_core::error::{AppError, ErrorKind};
use sitegate_core::result::AppResult;
use sitegate_entity::visitor::{VisitorKey, VisitorRecord};

/// SQLSTATE codes that indicate a lost race worth retrying.
const RETRYABLE_SQLSTATES: [&str; 3] = [
    "23505", // unique_violation
    "40001", // serialization_failure
    "40P01", // deadlock_detected
];

/// Upper bound on upsert attempts.
const MAX_UPSERT_ATTEMPTS: u32 = 3;

/// Repository for the `visitors` table.
#[derive(Debug, Clone)]
pub struct VisitorRepository {
    pool: PgPool,
}

impl VisitorRepository {
    /// Create a new visitor repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a first sighting or bumps an existing record, atomically.
    ///
    /// The unique constraint on `(origin_id, client_signature)` makes
    /// concurrent first sightings collapse onto one row.
    pub async fn upsert(&self, key: &VisitorKey, seen_at: DateTime<Utc>) -> AppResult<VisitorRecord> {
        let mut attempt = 1;
        loop {
            match self.try_upsert(key, seen_at).await {
                Ok(record) => return Ok(record),
                Err(e) if attempt < MAX_UPSERT_ATTEMPTS && is_retryable(&e) => {
                    debug!(attempt, error = %e, "Visitor upsert conflicted, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    return Err(AppError::with_source(
                        ErrorKind::Database,
                        "Failed to upsert visitor",
                        e,
                    ));
                }
            }
        }
    }

    async fn try_upsert(
        &self,
        key: &VisitorKey,
        seen_at: DateTime<Utc>,
    ) -> Result<VisitorRecord, sqlx::Error> {
        sqlx::query_as::<_, VisitorRecord>(
            "INSERT INTO visitors (origin_id, client_signature, first_seen, last_seen, visit_count) \
             VALUES ($1, $2, $3, $3, 1) \
             ON CONFLICT (origin_id, client_signature) DO UPDATE SET \
                last_seen = GREATEST(visitors.last_seen, EXCLUDED.last_seen), \
                visit_count = visitors.visit_count + 1 \
             RETURNING origin_id, client_signature, first_seen, last_seen, visit_count",
        )
        .bind(&key.origin_id)
        .bind(&key.client_signature)
        .bind(seen_at)
        .fetch_one(&self.pool)
        .await
    }

    /// Find the record for a key.
    pub async fn find(&self, key: &VisitorKey) -> AppResult<Option<VisitorRecord>> {
        sqlx::query_as::<_, VisitorRecord>(
            "SELECT origin_id, client_signature, first_seen, last_seen, visit_count \
             FROM visitors WHERE origin_id = $1 AND client_signature = $2",
        )
        .bind(&key.origin_id)
        .bind(&key.client_signature)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find visitor", e))
    }

    /// Most recently seen visitors first.
    pub async fn list_recent(&self, limit: i64) -> AppResult<Vec<VisitorRecord>> {
        sqlx::query_as::<_, VisitorRecord>(
            "SELECT origin_id, client_signature, first_seen, last_seen, visit_count \
             FROM visitors ORDER BY last_seen DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list visitors", e))
    }

    /// Count distinct visitors.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM visitors")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count visitors", e))
    }
}

fn is_retryable(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db
            .code()
            .is_some_and(|code| RETRYABLE_SQLSTATES.contains(&code.as_ref())),
        _ => false,
    }
}
