//! # sitegate-api
//!
//! HTTP layer for SiteGate built on Axum.
//!
//! Provides the staged request pipeline (authenticate, authorize, CSRF),
//! the visitor tracking side-channel, the live WebSocket endpoint, admin
//! endpoints, extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod pipeline;
pub mod router;
pub mod state;

pub use app::{build_app, run_server, serve};
pub use error::ApiError;
pub use pipeline::{RequestPipeline, RouteClass};
pub use state::AppState;
