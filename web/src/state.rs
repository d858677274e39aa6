//! Application state for Axum handlers.

use std::sync::Arc;
use wildtrails_auth::{
    AuthenticationGateway, CredentialVerifier, IdentityProviderVerifier, IdentityStore,
    PasswordHasher, PolicyTable, SessionTokenConfig, SessionTokenIssuer, SessionTokenVerifier,
    default_policy,
};
use wildtrails_bookings::{BookingLifecycle, BookingStore, Clock, DriverDirectory, Notifier};

/// Storage and side-effect collaborators the server is assembled from.
#[derive(Clone)]
pub struct Backends {
    /// Identity accounts.
    pub identities: Arc<dyn IdentityStore>,
    /// Password hashing.
    pub hasher: Arc<dyn PasswordHasher>,
    /// Booking persistence.
    pub bookings: Arc<dyn BookingStore>,
    /// Driver profiles and availability.
    pub drivers: Arc<dyn DriverDirectory>,
    /// Confirmation email delivery.
    pub notifier: Arc<dyn Notifier>,
    /// Wall clock.
    pub clock: Arc<dyn Clock>,
}

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Resolves bearer tokens to principals.
    pub gateway: AuthenticationGateway,
    /// Path authorization.
    pub policy: &'static PolicyTable,
    /// Provider-token verifier, when provider sign-in is configured.
    pub identity_provider: Option<Arc<IdentityProviderVerifier>>,
    /// Mints session tokens at login.
    pub sessions: SessionTokenIssuer,
    /// Booking transitions and listings.
    pub lifecycle: BookingLifecycle,
    /// Identity accounts.
    pub identities: Arc<dyn IdentityStore>,
    /// Password hashing.
    pub hasher: Arc<dyn PasswordHasher>,
    /// Driver profiles and availability.
    pub drivers: Arc<dyn DriverDirectory>,
    /// Wall clock.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wire the gateway and lifecycle controller over `backends`.
    ///
    /// The gateway tries the identity provider first (when configured), then
    /// session tokens.
    #[must_use]
    pub fn new(
        backends: Backends,
        session: SessionTokenConfig,
        identity_provider: Option<IdentityProviderVerifier>,
    ) -> Self {
        let identity_provider = identity_provider.map(Arc::new);
        let session_verifier: Arc<dyn CredentialVerifier> =
            Arc::new(SessionTokenVerifier::new(&session));

        let gateway = match &identity_provider {
            Some(provider) => {
                let provider: Arc<dyn CredentialVerifier> = provider.clone();
                AuthenticationGateway::standard(provider, session_verifier)
            }
            None => AuthenticationGateway::new().with_verifier(session_verifier),
        };

        let lifecycle = BookingLifecycle::new(
            backends.bookings,
            Arc::clone(&backends.drivers),
            backends.notifier,
            Arc::clone(&backends.clock),
        );

        Self {
            gateway,
            policy: default_policy(),
            identity_provider,
            sessions: SessionTokenIssuer::new(session),
            lifecycle,
            identities: backends.identities,
            hasher: backends.hasher,
            drivers: backends.drivers,
            clock: backends.clock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }
}
