//! # Wild Trails Bookings
//!
//! Booking lifecycle for the Wild Trails backend: driver assignment,
//! cancellation, listings, and the confirmation email sent on assignment.
//!
//! ## Architecture
//!
//! [`BookingLifecycle`] owns the state transitions and talks to three
//! collaborators through traits in [`providers`]:
//!
//! - [`BookingStore`] for persistence
//! - [`DriverDirectory`] for driver lookup and availability
//! - [`Notifier`] for best-effort email
//!
//! In-memory implementations live in [`mocks`] (feature `test-utils`,
//! on by default); PostgreSQL implementations in [`stores`] (feature
//! `postgres`).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod error;
pub mod lifecycle;
pub mod model;
pub mod providers;
pub mod recipient;
pub mod stores;
pub mod views;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use error::{BookingError, LifecycleError, NotificationError, Result};
pub use lifecycle::{AssignmentOutcome, BookingLifecycle};
pub use model::{
    Booking, BookingId, BookingStatus, CustomerId, CustomerLink, Driver, DriverId, DriverLink,
    DriverStatus, NewDriver, PackageId, PackageRef, PaymentStatus, PersonRef,
};
pub use providers::{BookingStore, Clock, DriverDirectory, Notifier, SystemClock};
pub use recipient::resolve_recipient;
pub use views::{BookingView, DriverView, UpcomingBookingView};
