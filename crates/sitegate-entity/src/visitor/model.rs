//! Visitor record entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a visitor: network origin plus client signature.
///
/// At most one [`VisitorRecord`] exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisitorKey {
    /// Network origin (client IP as seen by the server).
    pub origin_id: String,
    /// Client fingerprint (explicit header or hashed user agent).
    pub client_signature: String,
}

impl VisitorKey {
    /// Creates a key from its two parts.
    pub fn new(origin_id: impl Into<String>, client_signature: impl Into<String>) -> Self {
        Self {
            origin_id: origin_id.into(),
            client_signature: client_signature.into(),
        }
    }
}

/// A row in the `visitors` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VisitorRecord {
    /// Network origin.
    pub origin_id: String,
    /// Client fingerprint.
    pub client_signature: String,
    /// When this key was first seen.
    pub first_seen: DateTime<Utc>,
    /// When this key was last seen.
    pub last_seen: DateTime<Utc>,
    /// Number of sightings, starting at 1.
    pub visit_count: i64,
}

impl VisitorRecord {
    /// Builds the record for a key seen for the first time.
    pub fn first_sighting(key: &VisitorKey, seen_at: DateTime<Utc>) -> Self {
        Self {
            origin_id: key.origin_id.clone(),
            client_signature: key.client_signature.clone(),
            first_seen: seen_at,
            last_seen: seen_at,
            visit_count: 1,
        }
    }

    /// Applies a repeat sighting. `last_seen` never moves backwards.
    pub fn record_sighting(&mut self, seen_at: DateTime<Utc>) {
        if seen_at > self.last_seen {
            self.last_seen = seen_at;
        }
        self.visit_count += 1;
    }
}
