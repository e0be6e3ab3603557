//! CSRF cookie and token configuration.

use serde::{Deserialize, Serialize};

/// Double-submit CSRF configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfConfig {
    /// Server secret used to bind request tokens to the cookie secret.
    #[serde(default = "default_secret")]
    pub secret: String,
    /// Name of the cookie holding the per-client secret.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Cookie path.
    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,
    /// Whether the cookie is marked `Secure` (HTTPS only).
    #[serde(default)]
    pub cookie_secure: bool,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            cookie_name: default_cookie_name(),
            cookie_path: default_cookie_path(),
            cookie_secure: false,
        }
    }
}

fn default_secret() -> String {
    "CHANGE_ME_CSRF_SECRET".to_string()
}

fn default_cookie_name() -> String {
    "_csrf".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}
