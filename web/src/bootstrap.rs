//! Startup seeding.

use wildtrails_auth::{AuthError, Identity, IdentityStore, NewIdentity, PasswordHasher, Role};

/// Display name of the seeded administrator.
pub const ADMIN_NAME: &str = "System Admin";

/// Create the administrator account unless one with `email` exists.
///
/// Returns the identity when it was created by this call. Safe to run on
/// every start and from several instances at once.
///
/// # Errors
///
/// Returns error if hashing fails or the store is unreachable.
pub async fn ensure_admin(
    store: &dyn IdentityStore,
    hasher: &dyn PasswordHasher,
    email: &str,
    password: &str,
) -> Result<Option<Identity>, AuthError> {
    if store.find_by_email(email).await?.is_some() {
        tracing::debug!(%email, "Admin account present");
        return Ok(None);
    }

    let new = NewIdentity::new(email, ADMIN_NAME, Role::Admin).with_password_hash(hasher.hash(password)?);
    match store.create(new).await {
        Ok(identity) => {
            tracing::info!(user_id = %identity.id, %email, "Admin account created");
            Ok(Some(identity))
        }
        Err(AuthError::Conflict(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
