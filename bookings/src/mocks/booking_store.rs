//! In-memory booking store.

use crate::error::{BookingError, Result};
use crate::model::{Booking, BookingId};
use crate::providers::BookingStore;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Mock booking store.
///
/// Iterates in id order. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookingStore {
    bookings: Arc<Mutex<BTreeMap<BookingId, Booking>>>,
    saves: Arc<Mutex<usize>>,
}

fn poisoned() -> BookingError {
    BookingError::InternalError("booking store lock poisoned".to_string())
}

impl InMemoryBookingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-built bookings.
    #[must_use]
    pub fn with_bookings(bookings: impl IntoIterator<Item = Booking>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.bookings.lock() {
            map.extend(bookings.into_iter().map(|booking| (booking.id, booking)));
        }
        store
    }

    /// Copy of the stored booking, bypassing the async trait.
    #[must_use]
    pub fn get(&self, id: BookingId) -> Option<Booking> {
        self.bookings.lock().ok()?.get(&id).cloned()
    }

    /// Number of `save` calls so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.lock().map_or(0, |saves| *saves)
    }

    /// Snapshot of every booking, in id order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Booking> {
        self.bookings
            .lock()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>> {
        Ok(self.bookings.lock().map_err(|_| poisoned())?.get(&id).cloned())
    }

    async fn save(&self, booking: &Booking) -> Result<()> {
        self.bookings
            .lock()
            .map_err(|_| poisoned())?
            .insert(booking.id, booking.clone());
        *self.saves.lock().map_err(|_| poisoned())? += 1;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Booking>> {
        Ok(self
            .bookings
            .lock()
            .map_err(|_| poisoned())?
            .values()
            .cloned()
            .collect())
    }

    async fn find_by_safari_date_after(&self, reference: NaiveDateTime) -> Result<Vec<Booking>> {
        Ok(self
            .bookings
            .lock()
            .map_err(|_| poisoned())?
            .values()
            .filter(|booking| booking.safari_date > reference)
            .cloned()
            .collect())
    }
}
