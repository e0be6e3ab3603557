//! Caller identity.

use axum::Json;

use crate::dto::response::{ApiResponse, IdentityResponse};
use crate::extractors::AuthIdentity;

/// GET /api/me
pub async fn me(identity: AuthIdentity) -> Json<ApiResponse<IdentityResponse>> {
    Json(ApiResponse::ok(IdentityResponse {
        subject: identity.subject().to_string(),
        role: identity.role,
        issued_at: identity.issued_at(),
        expires_at: identity.expires_at(),
        expires_in_seconds: identity.remaining_ttl_seconds(),
    }))
}
