//! Mock provider implementations for testing.
//!
//! Simple, in-memory implementations of the provider traits for use in unit
//! and integration tests, plus a fixed RSA key pair for minting
//! identity-provider tokens locally.

pub mod identity_store;
pub mod keys;
pub mod password;

pub use identity_store::InMemoryIdentityStore;
pub use password::PlaintextPasswordHasher;
