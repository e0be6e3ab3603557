//! Deciding what counts as a page view and who made it.

use std::net::IpAddr;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use sitegate_core::config::PresenceConfig;
use sitegate_entity::visitor::VisitorKey;

/// Origin used when neither a forwarded address nor a peer address is known.
pub const UNKNOWN_ORIGIN: &str = "unknown";
/// Signature used when the client sent neither a fingerprint nor a user agent.
pub const ANONYMOUS_SIGNATURE: &str = "anonymous";

/// Path-based exclusion of API, live-channel and static asset requests.
#[derive(Debug, Clone)]
pub struct PathFilter {
    excluded_prefixes: Vec<String>,
    excluded_extensions: Vec<String>,
}

impl PathFilter {
    /// Builds a filter from the presence configuration.
    pub fn from_config(config: &PresenceConfig) -> Self {
        Self {
            excluded_prefixes: config.excluded_prefixes.clone(),
            excluded_extensions: config
                .excluded_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether a request for `path` is a human page view.
    pub fn should_track(&self, path: &str) -> bool {
        let excluded_prefix = self.excluded_prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        });
        if excluded_prefix {
            return false;
        }

        let last_segment = path.rsplit('/').next().unwrap_or_default();
        match last_segment.rsplit_once('.') {
            Some((_, ext)) => !self
                .excluded_extensions
                .iter()
                .any(|excluded| excluded.eq_ignore_ascii_case(ext)),
            None => true,
        }
    }
}

/// Derives the network origin of a request.
///
/// The first entry of `X-Forwarded-For` wins (the site runs behind a
/// proxy); otherwise the socket peer address is used.
pub fn origin_id(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> String {
    forwarded_for
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|ip| ip.to_string()))
        .unwrap_or_else(|| UNKNOWN_ORIGIN.to_string())
}

/// Derives the client signature of a request.
///
/// An explicit fingerprint header is used verbatim; otherwise the user
/// agent is hashed so raw header contents are never stored.
pub fn client_signature(fingerprint: Option<&str>, user_agent: Option<&str>) -> String {
    if let Some(fp) = fingerprint.map(str::trim).filter(|v| !v.is_empty()) {
        return fp.to_string();
    }
    match user_agent.map(str::trim).filter(|v| !v.is_empty()) {
        Some(ua) => URL_SAFE_NO_PAD.encode(Sha256::digest(ua.as_bytes())),
        None => ANONYMOUS_SIGNATURE.to_string(),
    }
}

/// Builds the visitor key for a request.
pub fn visitor_key(
    forwarded_for: Option<&str>,
    peer: Option<IpAddr>,
    fingerprint: Option<&str>,
    user_agent: Option<&str>,
) -> VisitorKey {
    VisitorKey::new(
        origin_id(forwarded_for, peer),
        client_signature(fingerprint, user_agent),
    )
}
