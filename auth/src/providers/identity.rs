//! Identity store trait.

use crate::error::{AuthError, Result};
use crate::identity::{Identity, NewIdentity, UserId};
use async_trait::async_trait;

/// Identity store.
///
/// This trait abstracts over the relational store holding accounts.
///
/// # Implementation Notes
///
/// - Email uniqueness must be enforced by the store itself (unique index or
///   an equivalent critical section), compared case-insensitively.
/// - `create` reports a uniqueness violation as [`AuthError::Conflict`] so
///   that callers can resolve concurrent inserts with [`provision_identity`].
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Get identity by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>>;

    /// Get identity by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>>;

    /// Create identity.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Email already exists → `AuthError::Conflict`
    /// - Store write fails
    async fn create(&self, identity: NewIdentity) -> Result<Identity>;
}

/// Create an identity, or return the row that won a concurrent insert.
///
/// Two first sign-ins for the same email may race. The store's uniqueness
/// constraint lets exactly one insert through; the loser re-reads and
/// returns the winner's row instead of failing.
///
/// # Errors
///
/// Returns error if the insert fails for a reason other than a conflict, or
/// if the conflicting row cannot be read back.
pub async fn provision_identity(store: &dyn IdentityStore, new: NewIdentity) -> Result<Identity> {
    let email = new.email.clone();

    match store.create(new).await {
        Ok(identity) => {
            tracing::info!(
                user_id = %identity.id,
                role = %identity.role,
                "Provisioned new identity"
            );
            Ok(identity)
        }
        Err(AuthError::Conflict(_)) => {
            tracing::debug!(%email, "Identity created concurrently, re-reading existing row");
            store.find_by_email(&email).await?.ok_or_else(|| {
                AuthError::InternalError(format!(
                    "identity for {email} conflicted on insert but cannot be read back"
                ))
            })
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::identity::Role;
    use crate::mocks::InMemoryIdentityStore;

    #[tokio::test]
    async fn test_provision_creates_missing_identity() {
        let store = InMemoryIdentityStore::new();

        let identity = provision_identity(
            &store,
            NewIdentity::new("new@x.com", "New", Role::Customer),
        )
        .await
        .unwrap();

        assert_eq!(identity.email, "new@x.com");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_provision_returns_winner_on_conflict() {
        let store = InMemoryIdentityStore::new();
        let winner = store
            .create(NewIdentity::new("race@x.com", "Winner", Role::Customer))
            .await
            .unwrap();

        let loser = provision_identity(
            &store,
            NewIdentity::new("RACE@x.com", "Loser", Role::Customer),
        )
        .await
        .unwrap();

        assert_eq!(loser.id, winner.id);
        assert_eq!(loser.name, "Winner");
        assert_eq!(store.len(), 1);
    }
}
