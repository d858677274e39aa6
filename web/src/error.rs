//! Error types for web handlers.
//!
//! [`AppError`] bridges domain errors and HTTP responses. The body is always
//! `{"code": ..., "message": ...}`; an attached source is logged on server
//! errors and never serialized.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use wildtrails_auth::{AuthError, AuthorizationFailure};
use wildtrails_bookings::{BookingError, LifecycleError};

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Profile>, AppError> {
///     let identity = store.find_by_email(&email).await?
///         .ok_or_else(|| AppError::not_found("No account for that email"))?;
///     Ok(Json(Profile::from(&identity)))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    code: &'static str,
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attach an internal cause (logged, not returned).
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "BAD_REQUEST")
    }

    /// Create a 401 error for a rejected email/password pair.
    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "Invalid email or password".to_string(),
            "INVALID_CREDENTIALS",
        )
    }

    /// Create a 401 error for a credential that did not verify.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), "INVALID_TOKEN")
    }

    /// Create a 403 error for a path that needs a principal.
    #[must_use]
    pub fn authentication_required() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "Authentication required".to_string(),
            "AUTHENTICATION_REQUIRED",
        )
    }

    /// Create a 403 error for a principal with the wrong role.
    #[must_use]
    pub fn access_denied() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "Access denied".to_string(),
            "ACCESS_DENIED",
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into(), "NOT_FOUND")
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), "CONFLICT")
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR",
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "Internal server error"
                ),
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<AuthorizationFailure> for AppError {
    fn from(failure: AuthorizationFailure) -> Self {
        match failure {
            AuthorizationFailure::Unauthenticated => Self::authentication_required(),
            AuthorizationFailure::Forbidden { .. } => Self::access_denied(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::invalid_credentials(),
            AuthError::Conflict(message) => Self::conflict(message),
            other => Self::internal("An internal error occurred").with_source(other),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Conflict(message) => Self::conflict(message),
            BookingError::InvalidData(message) => Self::bad_request(message),
            other => Self::internal("An internal error occurred").with_source(other),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NotFound(_) | LifecycleError::DriverNotFound(_) => {
                Self::not_found(err.to_string())
            }
            LifecycleError::Store(inner) => inner.into(),
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wildtrails_auth::Role;
    use wildtrails_bookings::{BookingId, DriverId};

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_authorization_failures_are_forbidden() {
        let unauthenticated = AppError::from(AuthorizationFailure::Unauthenticated);
        assert_eq!(unauthenticated.status(), StatusCode::FORBIDDEN);
        assert_eq!(unauthenticated.code(), "AUTHENTICATION_REQUIRED");

        let denied = AppError::from(AuthorizationFailure::Forbidden {
            required: vec![Role::Admin],
        });
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        assert_eq!(denied.code(), "ACCESS_DENIED");
    }

    #[test]
    fn test_lifecycle_errors() {
        let missing = AppError::from(LifecycleError::NotFound(BookingId(7)));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.to_string(), "[NOT_FOUND] Booking not found with ID: 7");

        let no_driver = AppError::from(LifecycleError::DriverNotFound(DriverId(2)));
        assert_eq!(no_driver.status(), StatusCode::NOT_FOUND);

        let store = AppError::from(LifecycleError::Store(BookingError::DatabaseError(
            "connection reset".to_string(),
        )));
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!store.to_string().contains("connection reset"));
    }

    #[test]
    fn test_invalid_credentials() {
        let err = AppError::from(AuthError::InvalidCredentials);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "INVALID_CREDENTIALS");
    }
}
