//! In-memory identity store.

use crate::error::{AuthError, Result};
use crate::identity::{Identity, NewIdentity, UserId};
use crate::providers::IdentityStore;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    by_id: BTreeMap<UserId, Identity>,
}

impl Inner {
    fn email_taken(&self, email: &str) -> bool {
        self.by_id
            .values()
            .any(|identity| identity.email.eq_ignore_ascii_case(email))
    }

    fn insert(&mut self, new: NewIdentity) -> Identity {
        self.next_id += 1;
        let identity = new.into_identity(UserId(self.next_id), Utc::now());
        self.by_id.insert(identity.id, identity.clone());
        identity
    }
}

/// Mock identity store.
///
/// Email uniqueness is checked under the same lock as the insert, so
/// concurrent creates behave like a unique index.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryIdentityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an identity synchronously, bypassing the conflict check.
    ///
    /// Returns the stored row. Intended for test setup.
    #[must_use]
    pub fn seed(&self, new: NewIdentity) -> Identity {
        match self.inner.lock() {
            Ok(mut inner) => inner.insert(new),
            Err(poisoned) => poisoned.into_inner().insert(new),
        }
    }

    /// Number of stored identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().map_or(0, |inner| inner.by_id.len())
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> AuthError {
    AuthError::InternalError("identity store lock poisoned".to_string())
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>> {
        let inner = self.inner.lock().map_err(|_| poisoned())?;
        Ok(inner.by_id.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        let inner = self.inner.lock().map_err(|_| poisoned())?;
        Ok(inner
            .by_id
            .values()
            .find(|identity| identity.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, new: NewIdentity) -> Result<Identity> {
        let mut inner = self.inner.lock().map_err(|_| poisoned())?;
        if inner.email_taken(&new.email) {
            return Err(AuthError::Conflict(format!("email already registered: {}", new.email)));
        }
        Ok(inner.insert(new))
    }
}
