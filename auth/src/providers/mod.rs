//! Authentication providers.
//!
//! Traits for every external collaborator the auth pipeline depends on, plus
//! the production implementations that are cheap enough to live here.
//!
//! # Architecture
//!
//! Providers are **interfaces**. Verifiers and handlers depend on these
//! traits; the binary wires in concrete implementations.
//!
//! - **Testing**: in-memory implementations from [`crate::mocks`]
//! - **Production**: PostgreSQL identity store, Argon2 hashing, remote JWK set
//! - **Development**: static keys and in-memory stores

pub mod identity;
pub mod keys;
pub mod password;

// Re-export provider traits
pub use identity::{IdentityStore, provision_identity};
pub use keys::{KeySource, RemoteJwks, StaticKeySource};
pub use password::{Argon2PasswordHasher, PasswordHasher};
