//! Mock provider implementations for testing.
//!
//! In-memory implementations of the booking provider traits for use in unit
//! and integration tests, and as the default backend of the development
//! server.

pub mod booking_store;
pub mod driver_directory;
pub mod notifier;

pub use booking_store::InMemoryBookingStore;
pub use driver_directory::InMemoryDriverDirectory;
pub use notifier::{RecordingNotifier, SentConfirmation};
