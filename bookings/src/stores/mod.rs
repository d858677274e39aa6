//! Persistent storage implementations.
//!
//! - **Booking Store** (PostgreSQL) - bookings joined with their customer,
//!   driver and package
//! - **Driver Directory** (PostgreSQL) - driver profiles and day-level
//!   availability

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::{PostgresBookingStore, PostgresDriverDirectory, migrate};
