//! Credential verifiers.
//!
//! Each verifier understands one token format and one trust source. The
//! [`crate::gateway::AuthenticationGateway`] tries them in a fixed order.

pub mod identity_provider;
pub mod session;

pub use identity_provider::{IdentityProviderConfig, IdentityProviderVerifier, ProviderClaims};
pub use session::{
    IssuedToken, SessionClaims, SessionTokenConfig, SessionTokenIssuer, SessionTokenVerifier,
};

use crate::error::VerificationFailure;
use crate::principal::{ResolvedIdentity, VerificationSource};
use async_trait::async_trait;

/// Validates a raw bearer token against one trust source.
///
/// Implementations must not leave partial state behind on failure. The only
/// permitted side effect is provisioning a new identity after a token has
/// been fully verified.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Trust source recorded on principals produced by this verifier.
    fn source(&self) -> VerificationSource;

    /// Verify `raw` and resolve it to a local identity.
    ///
    /// # Errors
    ///
    /// Returns the [`VerificationFailure`] kind describing why the token was
    /// not accepted. Callers treat every kind as non-fatal.
    async fn verify(&self, raw: &str) -> Result<ResolvedIdentity, VerificationFailure>;
}
