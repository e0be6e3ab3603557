//! Bearer token creation with configurable TTL.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use sitegate_core::config::AuthConfig;
use sitegate_core::error::AppError;
use sitegate_entity::user::Role;

use super::claims::IdentityClaim;

/// Creates signed HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    default_ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl TokenIssuer {
    /// Creates a new issuer from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            default_ttl: Duration::minutes(config.access_ttl_minutes as i64),
        }
    }

    /// Issues a token valid for the configured TTL from now.
    pub fn issue(&self, subject: &str, role: Role) -> Result<(String, DateTime<Utc>), AppError> {
        self.issue_at(subject, role, Utc::now(), self.default_ttl)
    }

    /// Issues a token with an explicit issue time and TTL.
    pub fn issue_at(
        &self,
        subject: &str,
        role: Role,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let expires_at = issued_at + ttl;
        let claims = IdentityClaim {
            sub: subject.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        Ok((token, expires_at))
    }
}
