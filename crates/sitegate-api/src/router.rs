//! Route definitions for the SiteGate HTTP API.
//!
//! Routes are grouped by [`RouteClass`]; each group gets its own
//! [`RequestPipeline`] as a route layer, so the class a route belongs to
//! is visible right where it is declared.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use sitegate_entity::user::Role;

use crate::handlers;
use crate::middleware;
use crate::pipeline::{self, RequestPipeline, RouteClass};
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(public_routes())
        .merge(guarded(
            identity_routes(),
            &state,
            RouteClass::read(&[]),
        ))
        .merge(guarded(
            staff_routes(),
            &state,
            RouteClass::read(&[Role::Admin, Role::Staff]),
        ))
        .merge(guarded(
            admin_read_routes(),
            &state,
            RouteClass::read(&[Role::Admin]),
        ))
        .merge(guarded(
            admin_write_routes(),
            &state,
            RouteClass::mutating(&[Role::Admin]),
        ));

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_handler))
        .fallback(handlers::pages::placeholder)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::presence::track_visitors,
        ))
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Applies the pipeline for `class` to every route in `routes`.
fn guarded(routes: Router<AppState>, state: &AppState, class: RouteClass) -> Router<AppState> {
    let pipeline = Arc::new(RequestPipeline::new(class, state));
    routes.route_layer(axum_middleware::from_fn_with_state(
        pipeline,
        pipeline::enforce,
    ))
}

/// Health and CSRF issuing: open to everyone
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/csrf-token", get(handlers::csrf::issue_token))
}

/// Any authenticated role
fn identity_routes() -> Router<AppState> {
    Router::new().route("/me", get(handlers::admin::identity::me))
}

/// Admin and staff read access
fn staff_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/visitors",
            get(handlers::admin::visitors::list_visitors),
        )
        .route("/admin/live", get(handlers::admin::live::live_status))
}

/// Admin-only reads
fn admin_read_routes() -> Router<AppState> {
    Router::new().route(
        "/health/detailed",
        get(handlers::health::health_detailed),
    )
}

/// Admin-only state changes (CSRF protected)
fn admin_write_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/live/broadcast",
            post(handlers::admin::live::broadcast),
        )
        .route(
            "/admin/live/{id}/disconnect",
            post(handlers::admin::live::disconnect),
        )
}
