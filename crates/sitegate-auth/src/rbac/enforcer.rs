//! Role membership guard.

use tracing::debug;

use sitegate_entity::user::Role;

use crate::error::AccessError;
use crate::jwt::IdentityClaim;

/// Enforces role membership for an authenticated identity.
///
/// Stateless; a single instance is shared by every route.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGuard;

impl AccessGuard {
    /// Creates a new guard.
    pub fn new() -> Self {
        Self
    }

    /// Checks that `claim` is present and its role is in `allowed`.
    ///
    /// An empty `allowed` set means "any authenticated role".
    pub fn authorize(
        &self,
        claim: Option<&IdentityClaim>,
        allowed: &[Role],
    ) -> Result<(), AccessError> {
        let claim = claim.ok_or(AccessError::NoIdentity)?;

        if allowed.is_empty() || allowed.contains(&claim.role) {
            return Ok(());
        }

        debug!(
            subject = %claim.sub,
            role = %claim.role,
            "Role not permitted for route"
        );
        Err(AccessError::RoleForbidden)
    }
}
