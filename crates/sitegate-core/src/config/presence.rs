//! Visitor tracking configuration.

use serde::{Deserialize, Serialize};

/// Backing store for visitor records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitorStoreKind {
    /// Process-local map; records are lost on restart.
    Memory,
    /// PostgreSQL `visitors` table.
    Postgres,
}

/// Visitor tracking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Whether page requests are recorded at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Which store holds visitor records.
    #[serde(default = "default_store")]
    pub store: VisitorStoreKind,
    /// Upper bound for a single store write, in milliseconds.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,
    /// Header carrying a client-computed fingerprint.
    #[serde(default = "default_signature_header")]
    pub signature_header: String,
    /// Take the origin from `X-Forwarded-For`. Only safe behind a proxy
    /// that overwrites the header; otherwise clients can pick their origin.
    #[serde(default = "default_true")]
    pub trust_forwarded_for: bool,
    /// Path prefixes that are never tracked (API, assets, live endpoint).
    #[serde(default = "default_excluded_prefixes")]
    pub excluded_prefixes: Vec<String>,
    /// File extensions that mark a static asset request.
    #[serde(default = "default_excluded_extensions")]
    pub excluded_extensions: Vec<String>,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            store: default_store(),
            store_timeout_ms: default_store_timeout(),
            signature_header: default_signature_header(),
            trust_forwarded_for: true,
            excluded_prefixes: default_excluded_prefixes(),
            excluded_extensions: default_excluded_extensions(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_store() -> VisitorStoreKind {
    VisitorStoreKind::Memory
}

fn default_store_timeout() -> u64 {
    2000
}

fn default_signature_header() -> String {
    "x-client-signature".to_string()
}

fn default_excluded_prefixes() -> Vec<String> {
    ["/api", "/static", "/assets", "/uploads", "/ws"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_excluded_extensions() -> Vec<String> {
    [
        "js", "css", "map", "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "woff", "woff2",
        "ttf", "txt", "xml", "json",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
