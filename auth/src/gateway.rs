//! Authentication gateway.
//!
//! Runs each configured [`CredentialVerifier`] in order against the bearer
//! token and keeps the first principal produced. It never rejects: a request
//! that no verifier accepts simply continues without a principal.

use crate::constants::BEARER_SCHEME;
use crate::error::VerificationFailure;
use crate::principal::{AuthenticatedPrincipal, VerificationSource};
use crate::verifiers::CredentialVerifier;
use std::sync::Arc;

/// Result of running the gateway for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// A verifier accepted the token.
    Authenticated(AuthenticatedPrincipal),
    /// No verifier accepted a token (or none was offered).
    Anonymous {
        /// Each verifier's failure, in the order tried. Empty when no token
        /// was presented.
        attempts: Vec<(VerificationSource, VerificationFailure)>,
    },
}

impl GatewayOutcome {
    /// The principal, if authentication succeeded.
    #[must_use]
    pub const fn principal(&self) -> Option<&AuthenticatedPrincipal> {
        match self {
            Self::Authenticated(principal) => Some(principal),
            Self::Anonymous { .. } => None,
        }
    }

    /// Consume the outcome, keeping only the principal.
    #[must_use]
    pub fn into_principal(self) -> Option<AuthenticatedPrincipal> {
        match self {
            Self::Authenticated(principal) => Some(principal),
            Self::Anonymous { .. } => None,
        }
    }
}

/// Ordered chain of credential verifiers.
#[derive(Clone, Default)]
pub struct AuthenticationGateway {
    verifiers: Vec<Arc<dyn CredentialVerifier>>,
}

impl AuthenticationGateway {
    /// Gateway with no verifiers; every request is anonymous.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a verifier. Verifiers run in insertion order.
    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifiers.push(verifier);
        self
    }

    /// The production order: identity provider first, then session tokens.
    ///
    /// A provider token must never be judged by the session verifier first,
    /// otherwise an expired provider token would look like "no credential".
    #[must_use]
    pub fn standard(
        identity_provider: Arc<dyn CredentialVerifier>,
        session: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self::new()
            .with_verifier(identity_provider)
            .with_verifier(session)
    }

    /// Authenticate a raw bearer token.
    pub async fn authenticate(&self, token: Option<&str>) -> GatewayOutcome {
        let Some(token) = token else {
            return GatewayOutcome::Anonymous {
                attempts: Vec::new(),
            };
        };

        let mut attempts = Vec::with_capacity(self.verifiers.len());
        for verifier in &self.verifiers {
            let source = verifier.source();
            match verifier.verify(token).await {
                Ok(resolved) => {
                    tracing::debug!(
                        user_id = %resolved.user_id,
                        role = %resolved.role,
                        %source,
                        "Request authenticated"
                    );
                    return GatewayOutcome::Authenticated(AuthenticatedPrincipal::new(
                        resolved, source,
                    ));
                }
                Err(failure) => {
                    if let VerificationFailure::Unavailable(reason) = &failure {
                        tracing::warn!(%source, %reason, "Verifier unavailable");
                    } else {
                        tracing::debug!(%source, %failure, "Verifier rejected token");
                    }
                    attempts.push((source, failure));
                }
            }
        }

        GatewayOutcome::Anonymous { attempts }
    }

    /// Authenticate from a raw `Authorization` header value.
    pub async fn authenticate_header(&self, header: Option<&str>) -> GatewayOutcome {
        self.authenticate(header.and_then(bearer_token)).await
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value.
///
/// The scheme is case-insensitive. Returns `None` for other schemes and for
/// an empty token.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();
    let scheme = header.get(..BEARER_SCHEME.len())?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }

    let rest = &header[BEARER_SCHEME.len()..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let token = rest.trim();
    if token.is_empty() { None } else { Some(token) }
}
