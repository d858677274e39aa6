//! # Wild Trails Authentication & Authorization
//!
//! Request authentication and path-based authorization for the Wild Trails
//! booking backend.
//!
//! ## Pipeline
//!
//! ```text
//! Authorization: Bearer <token>
//!        │
//!        ▼
//! AuthenticationGateway ── identity-provider verifier ──┐
//!        │               └─ session-token verifier ─────┤ first success wins
//!        ▼                                              │
//! Option<AuthenticatedPrincipal> ◄──────────────────────┘
//!        │
//!        ▼
//! PolicyTable::decide(path, principal) ── Ok(()) / AuthorizationFailure
//! ```
//!
//! The gateway never rejects a request. A token that no verifier accepts
//! leaves the request anonymous, and the [`PolicyTable`] decides whether the
//! requested path tolerates that.
//!
//! ## Example
//!
//! ```rust,ignore
//! use wildtrails_auth::{AuthenticationGateway, bearer_token, default_policy};
//!
//! let gateway = AuthenticationGateway::standard(idp_verifier, session_verifier);
//! let principal = gateway
//!     .authenticate(header.and_then(bearer_token))
//!     .await
//!     .into_principal();
//!
//! default_policy().decide("/api/admin/getAllBooking", principal.as_ref())?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod constants;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod policy;
pub mod principal;
pub mod providers;
pub mod stores;
pub mod verifiers;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use error::{AuthError, Result, VerificationFailure};
pub use gateway::{AuthenticationGateway, GatewayOutcome, bearer_token};
pub use identity::{Identity, NewIdentity, Role, UserId};
pub use policy::{AccessRule, AuthorizationFailure, PathPattern, PolicyTable, default_policy};
pub use principal::{AuthenticatedPrincipal, ResolvedIdentity, VerificationSource};
pub use providers::{IdentityStore, KeySource, PasswordHasher, provision_identity};
pub use verifiers::{
    CredentialVerifier, IdentityProviderConfig, IdentityProviderVerifier, IssuedToken,
    SessionClaims, SessionTokenConfig, SessionTokenIssuer, SessionTokenVerifier,
};
