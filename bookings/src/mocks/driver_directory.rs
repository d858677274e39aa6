//! In-memory driver directory.

use super::InMemoryBookingStore;
use crate::error::{BookingError, Result};
use crate::model::{BookingStatus, Driver, DriverId, NewDriver};
use crate::providers::DriverDirectory;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Mock driver directory.
///
/// Availability is computed against the bookings held by the paired
/// [`InMemoryBookingStore`].
#[derive(Debug, Clone)]
pub struct InMemoryDriverDirectory {
    drivers: Arc<Mutex<BTreeMap<DriverId, Driver>>>,
    bookings: InMemoryBookingStore,
}

fn poisoned() -> BookingError {
    BookingError::InternalError("driver directory lock poisoned".to_string())
}

impl InMemoryDriverDirectory {
    /// Create an empty directory backed by `bookings`.
    #[must_use]
    pub fn new(bookings: InMemoryBookingStore) -> Self {
        Self {
            drivers: Arc::new(Mutex::new(BTreeMap::new())),
            bookings,
        }
    }

    /// Insert or replace a driver as-is.
    pub fn insert(&self, driver: Driver) {
        if let Ok(mut drivers) = self.drivers.lock() {
            drivers.insert(driver.id, driver);
        }
    }

    /// Number of registered drivers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.drivers.lock().map_or(0, |drivers| drivers.len())
    }

    /// Whether no driver is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DriverDirectory for InMemoryDriverDirectory {
    async fn register(&self, driver: NewDriver) -> Result<Driver> {
        let mut drivers = self.drivers.lock().map_err(|_| poisoned())?;
        if drivers.values().any(|existing| existing.user.user_id == driver.user.user_id) {
            return Err(BookingError::Conflict(format!(
                "user {} already has a driver profile",
                driver.user.user_id
            )));
        }

        let id = DriverId(drivers.keys().next_back().map_or(1, |last| last.0 + 1));
        let driver = driver.into_driver(id);
        drivers.insert(id, driver.clone());
        Ok(driver)
    }

    async fn find_by_id(&self, id: DriverId) -> Result<Option<Driver>> {
        Ok(self.drivers.lock().map_err(|_| poisoned())?.get(&id).cloned())
    }

    async fn find_available_for(&self, date: NaiveDateTime) -> Result<Vec<Driver>> {
        let day = date.date();
        let busy: Vec<DriverId> = self
            .bookings
            .snapshot()
            .into_iter()
            .filter(|booking| {
                booking.status != BookingStatus::Cancelled && booking.safari_date.date() == day
            })
            .filter_map(|booking| booking.driver.map(|driver| driver.id))
            .collect();

        Ok(self
            .drivers
            .lock()
            .map_err(|_| poisoned())?
            .values()
            .filter(|driver| driver.is_available && !busy.contains(&driver.id))
            .cloned()
            .collect())
    }
}
