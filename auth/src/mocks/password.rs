//! Mock password hasher.

use crate::error::Result;
use crate::providers::PasswordHasher;

const PREFIX: &str = "plain:";

/// Reversible "hasher" for tests. Never use outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextPasswordHasher;

impl PasswordHasher for PlaintextPasswordHasher {
    fn hash(&self, plain: &str) -> Result<String> {
        Ok(format!("{PREFIX}{plain}"))
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        hash.strip_prefix(PREFIX) == Some(plain)
    }
}
