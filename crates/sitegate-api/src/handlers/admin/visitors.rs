//! Visitor listing.

use axum::Json;
use axum::extract::{Query, State};

use crate::dto::request::{VisitorListQuery, validate_request};
use crate::dto::response::{ApiResponse, VisitorListResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/admin/visitors?limit=
pub async fn list_visitors(
    State(state): State<AppState>,
    Query(query): Query<VisitorListQuery>,
) -> Result<Json<ApiResponse<VisitorListResponse>>, ApiError> {
    validate_request(&query)?;
    let items = state.presence.list_recent(query.limit()).await?;
    let total = state.presence.total().await?;
    Ok(Json(ApiResponse::ok(VisitorListResponse { total, items })))
}
