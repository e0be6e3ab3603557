//! Application builder: wires router, middleware and state into an Axum app.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::extract::Request;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use sitegate_core::config::{AppConfig, VisitorStoreKind};
use sitegate_core::error::AppError;
use sitegate_database::DatabasePool;
use sitegate_database::migration::run_migrations;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(
        &state.config.server.cors,
        &state.config.presence.signature_header,
    );
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            // Path only: the query string may carry a CSRF value.
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
            )
        }))
}

/// Runs the SiteGate server with the given configuration.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting SiteGate server...");

    let db = match config.presence.store {
        VisitorStoreKind::Postgres => {
            let db = DatabasePool::connect(&config.database).await?;
            run_migrations(&db).await?;
            Some(db)
        }
        VisitorStoreKind::Memory => None,
    };

    let addr = config.server.bind_address();
    let state = AppState::build(config, db)?;
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(addr = %addr, "SiteGate server listening");
    serve(listener, state, shutdown_signal()).await
}

/// Serves the app on `listener` until `shutdown` resolves, then closes the
/// live hub and the database pool.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(state.clone());
    let hub = state.hub.clone();
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown.await;
        info!("Shutdown signal received, closing live connections");
        if tokio::time::timeout(grace, hub.shutdown()).await.is_err() {
            warn!("Live hub did not drain within the grace period");
        }
    })
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(db) = &state.db {
        db.close().await;
    }

    info!("SiteGate server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
