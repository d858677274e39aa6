//! Console notifier for development.

use super::Notifier;
use crate::error::NotificationError;
use crate::model::BookingId;
use async_trait::async_trait;

/// Logs confirmation emails instead of sending them.
///
/// Selected when no SMTP host is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Create a new console notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send_booking_confirmation(
        &self,
        recipient: &str,
        booking_id: BookingId,
    ) -> Result<(), NotificationError> {
        tracing::info!(
            %recipient,
            %booking_id,
            "📧 Booking confirmation (console notifier, not sent)"
        );
        Ok(())
    }
}
