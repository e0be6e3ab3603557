//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sitegate_entity::user::Role;
use sitegate_entity::visitor::VisitorRecord;
use sitegate_realtime::ConnectionInfo;
use sitegate_realtime::metrics::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Basic health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Health check with subsystem details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    /// `connected`, `unreachable`, or `not_configured`
    pub database: String,
    pub live_connections: usize,
    /// Distinct visitors, when the store answered
    pub visitors: Option<u64>,
    pub hub: MetricsSnapshot,
}

/// Freshly issued CSRF value; the matching secret travels in the cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfTokenResponse {
    pub csrf_token: String,
}

/// The caller's own identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub subject: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Seconds until the token expires.
    pub expires_in_seconds: u64,
}

/// Visitor listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorListResponse {
    pub total: u64,
    pub items: Vec<VisitorRecord>,
}

/// Live hub status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveStatusResponse {
    pub count: usize,
    pub connections: Vec<ConnectionInfo>,
}

/// Result of an announcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastResponse {
    pub delivered: usize,
}
