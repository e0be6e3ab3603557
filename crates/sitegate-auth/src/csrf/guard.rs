//! CSRF token issuing and validation.
//!
//! The cookie holds a random per-client secret. The value the client
//! echoes back is `salt.mac`, where `mac = HMAC-SHA256(server_secret,
//! salt "." cookie_secret)`. Every issued value is distinct, and a value
//! only verifies against the cookie secret it was minted for.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;

use sitegate_core::config::CsrfConfig;

use crate::error::CsrfError;

type HmacSha256 = Hmac<Sha256>;

/// Bytes of entropy in a cookie secret.
const SECRET_BYTES: usize = 18;
/// Bytes of entropy in a per-token salt.
const SALT_BYTES: usize = 6;
/// HTTP methods that never mutate state and therefore skip validation.
const SAFE_METHODS: [&str; 4] = ["GET", "HEAD", "OPTIONS", "TRACE"];

/// A freshly issued cookie secret and the value the client must echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfTokenPair {
    /// Opaque secret stored in the HTTP-only cookie.
    pub cookie_value: String,
    /// Value returned to the page and echoed on unsafe requests.
    pub request_value: String,
}

/// Issues and validates double-submit token pairs.
#[derive(Clone)]
pub struct CsrfGuard {
    server_secret: Vec<u8>,
    config: CsrfConfig,
}

impl std::fmt::Debug for CsrfGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfGuard")
            .field("cookie_name", &self.config.cookie_name)
            .finish()
    }
}

impl CsrfGuard {
    /// Creates a guard from configuration.
    pub fn new(config: &CsrfConfig) -> Self {
        Self {
            server_secret: config.secret.as_bytes().to_vec(),
            config: config.clone(),
        }
    }

    /// Cookie settings this guard issues with.
    pub fn config(&self) -> &CsrfConfig {
        &self.config
    }

    /// Generates a new cookie secret and a request value bound to it.
    pub fn issue(&self) -> CsrfTokenPair {
        let cookie_value = random_token(SECRET_BYTES);
        let request_value = self.issue_for(&cookie_value);
        CsrfTokenPair {
            cookie_value,
            request_value,
        }
    }

    /// Mints another request value for a cookie secret the client already holds.
    pub fn issue_for(&self, cookie_value: &str) -> String {
        let salt = random_token(SALT_BYTES);
        let mac = self.mac(&salt, cookie_value).finalize().into_bytes();
        format!("{salt}.{}", URL_SAFE_NO_PAD.encode(mac))
    }

    /// Validates an echoed value against the cookie secret.
    ///
    /// The MAC comparison is constant-time.
    pub fn validate(
        &self,
        cookie_value: Option<&str>,
        supplied_value: Option<&str>,
    ) -> Result<(), CsrfError> {
        let cookie_value = cookie_value
            .filter(|v| !v.is_empty())
            .ok_or(CsrfError::TokenMissing)?;
        let supplied_value = supplied_value
            .filter(|v| !v.is_empty())
            .ok_or(CsrfError::TokenMissing)?;

        let (salt, encoded_mac) = supplied_value
            .split_once('.')
            .ok_or(CsrfError::TokenMismatch)?;
        let expected = URL_SAFE_NO_PAD
            .decode(encoded_mac)
            .map_err(|_| CsrfError::TokenMismatch)?;

        self.mac(salt, cookie_value)
            .verify_slice(&expected)
            .map_err(|_| CsrfError::TokenMismatch)
    }

    /// Whether requests with this method must carry a valid token.
    pub fn requires_validation(method: &str) -> bool {
        !SAFE_METHODS
            .iter()
            .any(|safe| safe.eq_ignore_ascii_case(method))
    }

    fn mac(&self, salt: &str, cookie_value: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.server_secret)
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
        mac.update(salt.as_bytes());
        mac.update(b".");
        mac.update(cookie_value.as_bytes());
        mac
    }
}

fn random_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
