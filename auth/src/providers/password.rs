//! Password hashing.

use crate::error::{AuthError, Result};
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};

/// Password hashing primitive.
///
/// Hashes are self-describing strings; `verify` never errors, a hash that
/// cannot be parsed simply does not verify.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHashing` if salt generation or hashing fails.
    fn hash(&self, plain: &str) -> Result<String>;

    /// Check a plaintext password against a stored hash.
    fn verify(&self, plain: &str, hash: &str) -> bool;
}

/// Argon2id hasher producing PHC strings.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    /// Create a hasher with the default Argon2id parameters.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plain: &str) -> Result<String> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|e| AuthError::PasswordHashing(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AuthError::PasswordHashing(e.to_string()))?;

        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|phc| phc.to_string())
            .map_err(|e| AuthError::PasswordHashing(e.to_string()))
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        PasswordHash::new(hash).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash("admin123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("admin123", &hash));
        assert!(!hasher.verify("admin124", &hash));
    }

    #[test]
    fn test_unparseable_hash_does_not_verify() {
        assert!(!Argon2PasswordHasher::new().verify("x", "not-a-phc-string"));
    }
}
