//! Persistent storage implementations.
//!
//! - **Identity Store** (PostgreSQL) - accounts with a case-insensitive
//!   unique email index

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::PostgresIdentityStore;
