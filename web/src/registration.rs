//! Driver registration.
//!
//! Creates the DRIVER identity, then the driver profile linked to it.

use serde::Deserialize;
use thiserror::Error;
use wildtrails_auth::{AuthError, IdentityStore, NewIdentity, PasswordHasher, Role};
use wildtrails_bookings::{BookingError, Driver, DriverDirectory, NewDriver, PersonRef};

/// Body of `POST /api/admin/register-driver`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDriverRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Vehicle description.
    #[serde(default, alias = "vehicle_type", alias = "vehicle")]
    pub vehicle_type: Option<String>,
    /// Photo path or URL.
    #[serde(default, alias = "photo_url")]
    pub photo_url: Option<String>,
}

/// Why a registration did not complete.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The request is incomplete.
    #[error("invalid registration: {0}")]
    Invalid(&'static str),

    /// Hashing or creating the identity failed (including a taken email).
    #[error(transparent)]
    Identity(#[from] AuthError),

    /// Creating the driver profile failed.
    #[error(transparent)]
    Directory(#[from] BookingError),
}

/// Register a driver account and profile.
///
/// # Errors
///
/// - [`RegistrationError::Invalid`] for a blank name, password, or an email
///   without `@`
/// - [`RegistrationError::Identity`] if the email is taken or the store fails
/// - [`RegistrationError::Directory`] if the profile cannot be created; the
///   identity created before it is left in place
pub async fn register_driver(
    identities: &dyn IdentityStore,
    hasher: &dyn PasswordHasher,
    drivers: &dyn DriverDirectory,
    request: RegisterDriverRequest,
) -> Result<Driver, RegistrationError> {
    let email = request.email.trim();
    let name = request.name.trim();
    if name.is_empty() {
        return Err(RegistrationError::Invalid("name is required"));
    }
    if !email.contains('@') {
        return Err(RegistrationError::Invalid("email is invalid"));
    }
    if request.password.is_empty() {
        return Err(RegistrationError::Invalid("password is required"));
    }

    let hash = hasher.hash(&request.password)?;
    let identity = identities
        .create(NewIdentity::new(email, name, Role::Driver).with_password_hash(hash))
        .await?;

    let driver = drivers
        .register(NewDriver {
            user: PersonRef {
                user_id: identity.id,
                name: identity.name,
                email: identity.email,
            },
            vehicle_type: request.vehicle_type.filter(|v| !v.trim().is_empty()),
            photo_url: request.photo_url.filter(|v| !v.trim().is_empty()),
        })
        .await?;

    tracing::info!(driver_id = %driver.id, user_id = %driver.user.user_id, "Driver registered");
    Ok(driver)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wildtrails_auth::mocks::{InMemoryIdentityStore, PlaintextPasswordHasher};
    use wildtrails_bookings::mocks::{InMemoryBookingStore, InMemoryDriverDirectory};

    fn request(email: &str) -> RegisterDriverRequest {
        serde_json::from_value(serde_json::json!({
            "name": " Nimal ",
            "email": email,
            "password": "pw",
            "vehicle_type": "Jeep",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_creates_identity_and_driver() {
        let identities = InMemoryIdentityStore::new();
        let drivers = InMemoryDriverDirectory::new(InMemoryBookingStore::new());

        let driver = register_driver(&identities, &PlaintextPasswordHasher, &drivers, request("n@x.com"))
            .await
            .unwrap();

        assert_eq!(driver.user.name, "Nimal");
        assert_eq!(driver.vehicle_type.as_deref(), Some("Jeep"));
        assert!(driver.is_available);

        let identity = identities.find_by_email("n@x.com").await.unwrap().unwrap();
        assert_eq!(identity.role, Role::Driver);
        assert_eq!(identity.password_hash.as_deref(), Some("plain:pw"));
        assert_eq!(drivers.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_fails() {
        let identities = InMemoryIdentityStore::new();
        let drivers = InMemoryDriverDirectory::new(InMemoryBookingStore::new());
        register_driver(&identities, &PlaintextPasswordHasher, &drivers, request("n@x.com"))
            .await
            .unwrap();

        let err = register_driver(&identities, &PlaintextPasswordHasher, &drivers, request("N@x.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::Identity(AuthError::Conflict(_))));
        assert_eq!(drivers.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_incomplete_requests() {
        let identities = InMemoryIdentityStore::new();
        let drivers = InMemoryDriverDirectory::new(InMemoryBookingStore::new());

        let err = register_driver(&identities, &PlaintextPasswordHasher, &drivers, request("no-at-sign"))
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::Invalid(_)));
        assert!(identities.is_empty());
    }
}
