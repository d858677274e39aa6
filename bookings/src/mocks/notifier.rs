//! Recording notifier.

use crate::error::NotificationError;
use crate::model::BookingId;
use crate::providers::Notifier;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A confirmation the notifier was asked to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentConfirmation {
    /// Address it went to.
    pub recipient: String,
    /// Booking it confirmed.
    pub booking_id: BookingId,
}

/// Mock notifier.
///
/// Records every delivery attempt. When told to fail, attempts are still
/// recorded but reported as transport failures.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentConfirmation>>>,
    failure: Option<String>,
}

impl RecordingNotifier {
    /// Notifier whose sends succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier whose sends fail with `reason`.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            sent: Arc::default(),
            failure: Some(reason.into()),
        }
    }

    /// Attempts so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentConfirmation> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_booking_confirmation(
        &self,
        recipient: &str,
        booking_id: BookingId,
    ) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .map_err(|_| NotificationError::Transport("notifier lock poisoned".to_string()))?
            .push(SentConfirmation {
                recipient: recipient.to_string(),
                booking_id,
            });

        match &self.failure {
            Some(reason) => Err(NotificationError::Transport(reason.clone())),
            None => Ok(()),
        }
    }
}
