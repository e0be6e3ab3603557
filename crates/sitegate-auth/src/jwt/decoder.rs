//! Bearer token authentication.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use sitegate_core::config::AuthConfig;

use super::claims::IdentityClaim;
use crate::error::AuthError;

/// Authentication scheme expected in the `Authorization` header.
const BEARER_PREFIX: &str = "Bearer ";

/// Verifies bearer tokens and yields the identity claim set.
///
/// Holds only the verification key; authentication is a pure function of
/// the key, the token and the clock.
#[derive(Clone)]
pub struct TokenAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("leeway", &self.validation.leeway)
            .finish()
    }
}

impl TokenAuthenticator {
    /// Creates a new authenticator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Authenticates a raw `Authorization` header value.
    ///
    /// Signature and structure are checked before expiry, so an expired
    /// token is only reported as expired when it was genuinely issued by us.
    pub fn authenticate(&self, raw_header: Option<&str>) -> Result<IdentityClaim, AuthError> {
        let token = raw_header
            .and_then(|h| h.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::CredentialMissing)?;

        self.verify(token)
    }

    /// Verifies a bare token string.
    pub fn verify(&self, token: &str) -> Result<IdentityClaim, AuthError> {
        decode::<IdentityClaim>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AuthError::CredentialExpired,
                other => {
                    debug!(reason = ?other, "Rejected bearer token");
                    AuthError::CredentialInvalid
                }
            })
    }
}
