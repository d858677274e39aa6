//! Request-scoped authentication results.

use crate::identity::{Identity, Role, UserId};
use serde::Serialize;
use std::fmt;

/// Which trust source vouched for a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationSource {
    /// Third-party identity-provider ID token.
    IdentityProvider,
    /// First-party signed session token.
    SessionToken,
}

impl VerificationSource {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IdentityProvider => "identity_provider",
            Self::SessionToken => "session_token",
        }
    }
}

impl fmt::Display for VerificationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a credential verifier resolved a token to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    /// Local identity.
    pub user_id: UserId,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role claim.
    pub role: Role,
}

impl From<&Identity> for ResolvedIdentity {
    fn from(identity: &Identity) -> Self {
        Self {
            user_id: identity.id,
            email: identity.email.clone(),
            name: identity.name.clone(),
            role: identity.role,
        }
    }
}

/// Authenticated caller of the current request.
///
/// Built by the gateway, carried in request extensions, dropped when the
/// request completes. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedPrincipal {
    /// Local identity.
    pub user_id: UserId,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role used for authorization decisions.
    pub role: Role,
    /// Verifier that accepted the credential.
    pub source: VerificationSource,
}

impl AuthenticatedPrincipal {
    /// Bind a resolved identity to the source that verified it.
    #[must_use]
    pub fn new(resolved: ResolvedIdentity, source: VerificationSource) -> Self {
        Self {
            user_id: resolved.user_id,
            email: resolved.email,
            name: resolved.name,
            role: resolved.role,
            source,
        }
    }

    /// Returns `true` if the principal holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Returns `true` if the principal holds any of `roles`.
    #[must_use]
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}
