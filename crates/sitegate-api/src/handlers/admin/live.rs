//! Admin control of live connections.

use axum::Json;
use axum::extract::{Path, State};
use tracing::info;
use uuid::Uuid;

use sitegate_core::error::AppError;
use sitegate_realtime::OutboundMessage;

use crate::dto::request::{BroadcastRequest, validate_request};
use crate::dto::response::{ApiResponse, BroadcastResponse, LiveStatusResponse};
use crate::error::ApiError;
use crate::extractors::AuthIdentity;
use crate::state::AppState;

/// GET /api/admin/live
pub async fn live_status(State(state): State<AppState>) -> Json<ApiResponse<LiveStatusResponse>> {
    let connections = state.hub.snapshot().await;
    Json(ApiResponse::ok(LiveStatusResponse {
        count: state.hub.count().count,
        connections,
    }))
}

/// POST /api/admin/live/broadcast
pub async fn broadcast(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Json(req): Json<BroadcastRequest>,
) -> Result<Json<ApiResponse<BroadcastResponse>>, ApiError> {
    validate_request(&req)?;

    let delivered = state
        .hub
        .announce(OutboundMessage::announcement(
            req.title,
            req.message,
            req.severity,
        ))
        .await;

    info!(subject = %identity.sub, delivered, "Announcement sent");
    Ok(Json(ApiResponse::ok(BroadcastResponse { delivered })))
}

/// POST /api/admin/live/{id}/disconnect
pub async fn disconnect(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.hub.disconnect(id).await {
        return Err(AppError::not_found(format!("Live connection {id} not found")).into());
    }

    info!(subject = %identity.sub, conn_id = %id, "Live connection disconnected");
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "disconnected": id } }),
    ))
}
