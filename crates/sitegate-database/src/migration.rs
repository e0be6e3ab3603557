//! Embedded database migrations.

use sqlx::migrate::Migrator;
use tracing::info;

use sitegate_core::error::{AppError, ErrorKind};

use crate::connection::DatabasePool;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applies every pending migration from `migrations/`.
pub async fn run_migrations(db: &DatabasePool) -> Result<(), AppError> {
    info!(count = MIGRATOR.iter().count(), "Applying database migrations");

    MIGRATOR.run(db.pool()).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!("Database migrations applied");
    Ok(())
}
