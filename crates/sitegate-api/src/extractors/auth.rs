//! `AuthIdentity` extractor: the claim set left behind by the request pipeline.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use sitegate_auth::{AccessError, IdentityClaim};

use crate::error::ApiError;

/// Identity of the caller on routes guarded by an authenticated class.
///
/// Does no verification of its own; on a route without an authenticating
/// pipeline it always rejects with `NO_IDENTITY`.
#[derive(Debug, Clone)]
pub struct AuthIdentity(pub IdentityClaim);

impl std::ops::Deref for AuthIdentity {
    type Target = IdentityClaim;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityClaim>()
            .cloned()
            .map(AuthIdentity)
            .ok_or_else(|| AccessError::NoIdentity.into())
    }
}
