//! Booking providers.
//!
//! External collaborators of the lifecycle controller.
//!
//! # Architecture
//!
//! - **Testing**: in-memory implementations from [`crate::mocks`]
//! - **Production**: PostgreSQL store and directory, SMTP notifier
//! - **Development**: in-memory store, console notifier

pub mod clock;
pub mod console_notifier;
pub mod smtp_notifier;

pub use clock::{Clock, SystemClock};
pub use console_notifier::ConsoleNotifier;
pub use smtp_notifier::{SmtpNotifier, SmtpSettings};

use crate::error::{NotificationError, Result};
use crate::model::{Booking, BookingId, Driver, DriverId, NewDriver};
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Booking persistence.
///
/// Saves overwrite the whole row. There is no version check, so concurrent
/// writers to the same booking race and the last save wins.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Get booking by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>>;

    /// Persist `booking`, replacing the stored row with the same id.
    ///
    /// # Errors
    ///
    /// Returns error if the store write fails.
    async fn save(&self, booking: &Booking) -> Result<()>;

    /// Every booking, in store order.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    async fn find_all(&self) -> Result<Vec<Booking>>;

    /// Bookings whose safari date is strictly after `reference`.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    async fn find_by_safari_date_after(&self, reference: NaiveDateTime) -> Result<Vec<Booking>>;
}

/// Driver registry and availability.
#[async_trait]
pub trait DriverDirectory: Send + Sync {
    /// Register a driver for an existing account.
    ///
    /// # Errors
    ///
    /// Returns error if the account already has a driver profile or the
    /// write fails.
    async fn register(&self, driver: NewDriver) -> Result<Driver>;

    /// Get driver by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    async fn find_by_id(&self, id: DriverId) -> Result<Option<Driver>>;

    /// Drivers free on the calendar day of `date`.
    ///
    /// A driver is free when flagged available and not assigned to any
    /// non-cancelled booking whose safari falls on that day.
    ///
    /// # Errors
    ///
    /// Returns error if the store query fails.
    async fn find_available_for(&self, date: NaiveDateTime) -> Result<Vec<Driver>>;
}

/// Best-effort delivery of lifecycle emails.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tell `recipient` that booking `booking_id` is confirmed.
    ///
    /// # Errors
    ///
    /// Returns the reason delivery failed. Nothing is retried.
    async fn send_booking_confirmation(
        &self,
        recipient: &str,
        booking_id: BookingId,
    ) -> std::result::Result<(), NotificationError>;
}
