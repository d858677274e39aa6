//! Booking lifecycle controller.
//!
//! ```text
//! pending ──assign──▶ confirmed
//!    │                   │
//!    └──────cancel───────┴──▶ cancelled
//! ```
//!
//! Assignment is two-phase. The state change is persisted first; the
//! confirmation email is attempted afterwards and its failure never undoes
//! the assignment.

use crate::error::LifecycleError;
use crate::model::{Booking, BookingId, BookingStatus, DriverId, DriverStatus};
use crate::providers::{BookingStore, Clock, DriverDirectory, Notifier};
use crate::recipient::resolve_recipient;
use crate::views::{BookingView, UpcomingBookingView};
use chrono::NaiveDateTime;
use std::sync::Arc;

/// Result of a committed driver assignment.
///
/// Every variant carries the booking as persisted. Only
/// [`AssignmentOutcome::Notified`] is a full success.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentOutcome {
    /// Assigned, and the confirmation was handed to the mail transport.
    Notified {
        /// The persisted booking.
        booking: Booking,
        /// Address the confirmation went to.
        recipient: String,
    },
    /// Assigned, but nobody could be contacted.
    NoRecipient {
        /// The persisted booking.
        booking: Booking,
    },
    /// Assigned, but the confirmation could not be delivered.
    NotificationFailed {
        /// The persisted booking.
        booking: Booking,
        /// Address the confirmation was meant for.
        recipient: String,
        /// Delivery failure, as reported by the notifier.
        reason: String,
    },
}

impl AssignmentOutcome {
    /// The booking as persisted.
    #[must_use]
    pub const fn booking(&self) -> &Booking {
        match self {
            Self::Notified { booking, .. }
            | Self::NoRecipient { booking }
            | Self::NotificationFailed { booking, .. } => booking,
        }
    }

    /// Whether the confirmation went out.
    #[must_use]
    pub const fn is_fully_successful(&self) -> bool {
        matches!(self, Self::Notified { .. })
    }
}

/// Drives booking state transitions.
#[derive(Clone)]
pub struct BookingLifecycle {
    bookings: Arc<dyn BookingStore>,
    drivers: Arc<dyn DriverDirectory>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl BookingLifecycle {
    /// Create a controller over its collaborators.
    #[must_use]
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        drivers: Arc<dyn DriverDirectory>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            drivers,
            notifier,
            clock,
        }
    }

    async fn load(&self, id: BookingId) -> Result<Booking, LifecycleError> {
        self.bookings
            .find_by_id(id)
            .await?
            .ok_or(LifecycleError::NotFound(id))
    }

    /// Mark the booking confirmed with a driver assigned, then notify.
    ///
    /// When `driver` is given the booking is linked to that driver.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::NotFound`] if the booking does not exist
    /// - [`LifecycleError::DriverNotFound`] if `driver` does not exist
    /// - [`LifecycleError::Store`] if loading or saving fails
    ///
    /// Nothing is persisted in any error case. Notification problems are not
    /// errors; see [`AssignmentOutcome`].
    pub async fn assign_driver(
        &self,
        id: BookingId,
        driver: Option<DriverId>,
    ) -> Result<AssignmentOutcome, LifecycleError> {
        let mut booking = self.load(id).await?;

        if let Some(driver_id) = driver {
            let driver = self
                .drivers
                .find_by_id(driver_id)
                .await?
                .ok_or(LifecycleError::DriverNotFound(driver_id))?;
            booking.driver = Some(driver.link());
        }

        booking.driver_status = DriverStatus::Assigned;
        booking.status = BookingStatus::Confirmed;
        booking.updated_at = Some(self.clock.now());
        self.bookings.save(&booking).await?;

        tracing::info!(booking_id = %id, driver_id = ?driver, "Driver assigned");

        let Some(recipient) = resolve_recipient(&booking) else {
            tracing::warn!(booking_id = %id, "No recipient for booking confirmation");
            return Ok(AssignmentOutcome::NoRecipient { booking });
        };

        match self.notifier.send_booking_confirmation(&recipient, id).await {
            Ok(()) => Ok(AssignmentOutcome::Notified { booking, recipient }),
            Err(e) => {
                tracing::warn!(booking_id = %id, %recipient, error = %e, "Booking confirmation not delivered");
                Ok(AssignmentOutcome::NotificationFailed {
                    booking,
                    recipient,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Move the booking to `cancelled`.
    ///
    /// No guard on the current status and no notification. Cancelling a
    /// cancelled booking persists it again unchanged apart from `updated_at`.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::NotFound`] if the booking does not exist
    /// - [`LifecycleError::Store`] if loading or saving fails
    pub async fn cancel_booking(&self, id: BookingId) -> Result<Booking, LifecycleError> {
        let mut booking = self.load(id).await?;

        booking.status = BookingStatus::Cancelled;
        booking.updated_at = Some(self.clock.now());
        self.bookings.save(&booking).await?;

        tracing::info!(booking_id = %id, "Booking cancelled");
        Ok(booking)
    }

    /// Bookings whose safari is strictly after `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] if the query fails.
    pub async fn list_upcoming(
        &self,
        reference: NaiveDateTime,
    ) -> Result<Vec<UpcomingBookingView>, LifecycleError> {
        let bookings = self.bookings.find_by_safari_date_after(reference).await?;
        Ok(bookings.iter().map(UpcomingBookingView::from).collect())
    }

    /// Every booking.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] if the query fails.
    pub async fn list_all(&self) -> Result<Vec<BookingView>, LifecycleError> {
        let bookings = self.bookings.find_all().await?;
        Ok(bookings.iter().map(BookingView::from).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{InMemoryBookingStore, InMemoryDriverDirectory, RecordingNotifier};
    use crate::model::{CustomerId, CustomerLink, NewDriver, PersonRef};
    use crate::providers::SystemClock;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use wildtrails_auth::UserId;

    fn safari(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, day).unwrap().and_hms_opt(6, 0, 0).unwrap()
    }

    fn guest_booking(id: i64, email: Option<&str>) -> Booking {
        let mut booking = Booking::new(BookingId(id), safari(10));
        booking.guest_email = email.map(str::to_string);
        booking
    }

    struct Harness {
        store: InMemoryBookingStore,
        drivers: InMemoryDriverDirectory,
        notifier: RecordingNotifier,
        lifecycle: BookingLifecycle,
    }

    fn harness(bookings: Vec<Booking>, notifier: RecordingNotifier) -> Harness {
        let store = InMemoryBookingStore::with_bookings(bookings);
        let drivers = InMemoryDriverDirectory::new(store.clone());
        let lifecycle = BookingLifecycle::new(
            Arc::new(store.clone()),
            Arc::new(drivers.clone()),
            Arc::new(notifier.clone()),
            Arc::new(SystemClock),
        );
        Harness {
            store,
            drivers,
            notifier,
            lifecycle,
        }
    }

    #[tokio::test]
    async fn test_assign_notifies_guest() {
        let h = harness(vec![guest_booking(1, Some(" g@x.com "))], RecordingNotifier::new());

        let outcome = h.lifecycle.assign_driver(BookingId(1), None).await.unwrap();

        assert!(outcome.is_fully_successful());
        let stored = h.store.get(BookingId(1)).unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
        assert_eq!(stored.driver_status, DriverStatus::Assigned);
        assert!(stored.updated_at.is_some());
        assert_eq!(h.notifier.sent()[0].recipient, "g@x.com");
        assert_eq!(h.notifier.sent()[0].booking_id, BookingId(1));
    }

    #[tokio::test]
    async fn test_assign_without_recipient_still_commits() {
        let h = harness(vec![guest_booking(2, None)], RecordingNotifier::new());

        let outcome = h.lifecycle.assign_driver(BookingId(2), None).await.unwrap();

        assert!(matches!(outcome, AssignmentOutcome::NoRecipient { .. }));
        assert_eq!(h.store.get(BookingId(2)).unwrap().status, BookingStatus::Confirmed);
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_assign_with_failing_notifier_still_commits() {
        let mut booking = guest_booking(3, None);
        booking.customer = Some(CustomerLink {
            id: CustomerId(1),
            user: Some(PersonRef {
                user_id: UserId(5),
                name: "C".to_string(),
                email: "c@x.com".to_string(),
            }),
        });
        let h = harness(vec![booking], RecordingNotifier::failing("SMTP down"));

        let outcome = h.lifecycle.assign_driver(BookingId(3), None).await.unwrap();

        assert_eq!(
            outcome,
            AssignmentOutcome::NotificationFailed {
                booking: h.store.get(BookingId(3)).unwrap(),
                recipient: "c@x.com".to_string(),
                reason: "Failed to send email: SMTP down".to_string(),
            }
        );
        assert_eq!(h.store.get(BookingId(3)).unwrap().driver_status, DriverStatus::Assigned);
    }

    #[tokio::test]
    async fn test_assign_links_requested_driver() {
        let h = harness(vec![guest_booking(4, Some("g@x.com"))], RecordingNotifier::new());
        let driver = h
            .drivers
            .register(NewDriver {
                user: PersonRef {
                    user_id: UserId(20),
                    name: "Ruwan".to_string(),
                    email: "ruwan@x.com".to_string(),
                },
                vehicle_type: Some("Jeep".to_string()),
                photo_url: None,
            })
            .await
            .unwrap();

        let outcome = h.lifecycle.assign_driver(BookingId(4), Some(driver.id)).await.unwrap();

        assert_eq!(outcome.booking().driver_name(), Some("Ruwan"));
        assert!(h.drivers.find_available_for(safari(10)).await.unwrap().is_empty());
        assert_eq!(h.drivers.find_available_for(safari(11)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_assign_unknown_driver_persists_nothing() {
        let h = harness(vec![guest_booking(5, Some("g@x.com"))], RecordingNotifier::new());

        let err = h
            .lifecycle
            .assign_driver(BookingId(5), Some(DriverId(99)))
            .await
            .unwrap_err();

        assert_eq!(err, LifecycleError::DriverNotFound(DriverId(99)));
        assert_eq!(h.store.save_count(), 0);
        assert_eq!(h.store.get(BookingId(5)).unwrap().status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_missing_booking_is_not_found_without_mutation() {
        let h = harness(vec![guest_booking(1, Some("g@x.com"))], RecordingNotifier::new());

        assert_eq!(
            h.lifecycle.assign_driver(BookingId(404), None).await.unwrap_err(),
            LifecycleError::NotFound(BookingId(404))
        );
        assert_eq!(
            h.lifecycle.cancel_booking(BookingId(404)).await.unwrap_err(),
            LifecycleError::NotFound(BookingId(404))
        );
        assert_eq!(h.store.save_count(), 0);
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_is_repeatable_and_silent() {
        let h = harness(vec![guest_booking(6, Some("g@x.com"))], RecordingNotifier::new());

        let first = h.lifecycle.cancel_booking(BookingId(6)).await.unwrap();
        let second = h.lifecycle.cancel_booking(BookingId(6)).await.unwrap();

        assert_eq!(first.status, BookingStatus::Cancelled);
        assert_eq!(second.status, BookingStatus::Cancelled);
        assert_eq!(h.store.save_count(), 2);
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_listing() {
        let bookings = (1..=5).map(|day| Booking::new(BookingId(i64::from(day)), safari(day))).collect();
        let h = harness(bookings, RecordingNotifier::new());

        let upcoming = h.lifecycle.list_upcoming(safari(3)).await.unwrap();
        let all = h.lifecycle.list_all().await.unwrap();

        let ids: Vec<_> = upcoming.iter().map(|view| view.id).collect();
        assert_eq!(ids, vec![BookingId(4), BookingId(5)]);
        assert_eq!(all.len(), 5);
    }

    proptest! {
        #[test]
        fn prop_assign_always_confirms(
            guest in prop::option::of("[a-z]{0,5}(@x\\.com)?"),
            fail in any::<bool>(),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let notifier = if fail { RecordingNotifier::failing("down") } else { RecordingNotifier::new() };
            let h = harness(vec![guest_booking(1, guest.as_deref())], notifier);

            let outcome = runtime.block_on(h.lifecycle.assign_driver(BookingId(1), None)).unwrap();

            let stored = h.store.get(BookingId(1)).unwrap();
            prop_assert_eq!(stored.status, BookingStatus::Confirmed);
            prop_assert_eq!(stored.driver_status, DriverStatus::Assigned);
            prop_assert_eq!(outcome.booking(), &stored);
        }

        #[test]
        fn prop_upcoming_is_strictly_after(days in prop::collection::vec(1u32..=28, 0..12), pivot in 1u32..=28) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let bookings: Vec<Booking> = days
                .iter()
                .enumerate()
                .map(|(i, day)| Booking::new(BookingId(i64::try_from(i).unwrap()), safari(*day)))
                .collect();
            let expected = days.iter().filter(|day| **day > pivot).count();
            let h = harness(bookings, RecordingNotifier::new());

            let upcoming = runtime.block_on(h.lifecycle.list_upcoming(safari(pivot))).unwrap();

            prop_assert_eq!(upcoming.len(), expected);
            prop_assert!(upcoming.iter().all(|view| view.safari_date > safari(pivot)));
        }
    }
}
