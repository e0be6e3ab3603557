//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use sitegate_auth::{AccessGuard, CsrfGuard, TokenAuthenticator};
use sitegate_core::config::AppConfig;
use sitegate_core::result::AppResult;
use sitegate_database::DatabasePool;
use sitegate_realtime::LiveSessionHub;
use sitegate_service::presence::{PresenceTracker, VisitorStore, build_visitor_store};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool, present when visitors are stored in the database
    pub db: Option<DatabasePool>,

    // ── Request pipeline ─────────────────────────────────────
    /// Bearer token authenticator
    pub authenticator: Arc<TokenAuthenticator>,
    /// Role guard
    pub access_guard: AccessGuard,
    /// Double-submit CSRF guard
    pub csrf: Arc<CsrfGuard>,

    // ── Presence & Realtime ──────────────────────────────────
    /// Visitor tracker
    pub presence: PresenceTracker,
    /// Live connection hub
    pub hub: LiveSessionHub,

    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Builds state with the visitor store named by configuration.
    ///
    /// Starts the live hub, so it must run inside a Tokio runtime.
    pub fn build(config: AppConfig, db: Option<DatabasePool>) -> AppResult<Self> {
        let store = build_visitor_store(&config.presence, db.as_ref())?;
        Ok(Self::with_store(config, store, db))
    }

    /// Builds state around an explicit visitor store.
    pub fn with_store(
        config: AppConfig,
        store: Arc<dyn VisitorStore>,
        db: Option<DatabasePool>,
    ) -> Self {
        let presence = PresenceTracker::new(&config.presence, store);
        let hub = LiveSessionHub::start(&config.realtime);

        Self {
            authenticator: Arc::new(TokenAuthenticator::new(&config.auth)),
            access_guard: AccessGuard::new(),
            csrf: Arc::new(CsrfGuard::new(&config.csrf)),
            presence,
            hub,
            db,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}
