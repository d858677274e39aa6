//! Error types for booking storage, notification and lifecycle operations.

use crate::model::{BookingId, DriverId};
use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Failures of the booking store and driver directory.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored row could not be mapped to the model.
    #[error("Invalid stored value: {0}")]
    InvalidData(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Why a confirmation email was not delivered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// Sender or recipient address does not parse.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The message could not be assembled.
    #[error("Failed to build email: {0}")]
    Build(String),

    /// The mail transport refused or failed.
    #[error("Failed to send email: {0}")]
    Transport(String),
}

/// Failures of a lifecycle transition.
///
/// Notification problems are not errors here; they are reported through
/// [`crate::lifecycle::AssignmentOutcome`] because the transition has
/// already been committed when they happen.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// No booking with this id.
    #[error("Booking not found with ID: {0}")]
    NotFound(BookingId),

    /// The driver to assign does not exist.
    #[error("Driver not found with ID: {0}")]
    DriverNotFound(DriverId),

    /// The booking store failed.
    #[error(transparent)]
    Store(#[from] BookingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_echoes_id() {
        assert_eq!(
            LifecycleError::NotFound(BookingId(17)).to_string(),
            "Booking not found with ID: 17"
        );
    }

    #[test]
    fn test_store_error_is_transparent() {
        let err = LifecycleError::from(BookingError::DatabaseError("down".to_string()));

        assert_eq!(err.to_string(), "Database error: down");
    }
}
