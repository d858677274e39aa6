//! Admin endpoints (`/api/admin/**`, ADMIN only via the policy table).
//!
//! Response bodies of the mutating endpoints are plain text, as the admin
//! dashboard displays them verbatim.

use crate::error::AppError;
use crate::registration::{RegisterDriverRequest, register_driver as register};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use wildtrails_bookings::{
    AssignmentOutcome, BookingId, BookingView, DriverId, DriverView, LifecycleError,
    UpcomingBookingView,
};

/// Plain-text response.
pub type TextResponse = (StatusCode, String);

fn text(status: StatusCode, body: impl Into<String>) -> TextResponse {
    (status, body.into())
}

/// `POST /api/admin/register-driver`.
///
/// Any failure, including an unparseable body, answers 400 with a fixed
/// message; the cause is logged only.
pub async fn register_driver(
    State(state): State<AppState>,
    body: Result<Json<RegisterDriverRequest>, JsonRejection>,
) -> TextResponse {
    let result = match body {
        Ok(Json(request)) => register(
            state.identities.as_ref(),
            state.hasher.as_ref(),
            state.drivers.as_ref(),
            request,
        )
        .await
        .map_err(|e| e.to_string()),
        Err(rejection) => Err(rejection.body_text()),
    };

    match result {
        Ok(_) => text(StatusCode::OK, "Driver registered successfully."),
        Err(cause) => {
            tracing::error!(%cause, "Driver registration failed");
            text(StatusCode::BAD_REQUEST, "Something went wrong: ")
        }
    }
}

/// Query of `getAvailableDrivers`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDriversQuery {
    /// ISO date-time of the safari.
    pub booking_date: String,
}

/// Parse an ISO-8601 date-time as local time. An offset, if present, is
/// dropped rather than applied.
fn parse_local_date_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    raw.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
}

/// `POST /api/admin/getAvailableDrivers?bookingDate=...`.
///
/// # Errors
///
/// 400 if `bookingDate` is not an ISO date-time; 500 if the directory fails.
pub async fn available_drivers(
    State(state): State<AppState>,
    Query(query): Query<AvailableDriversQuery>,
) -> Result<Json<Vec<DriverView>>, AppError> {
    let date = parse_local_date_time(&query.booking_date)
        .ok_or_else(|| AppError::bad_request(format!("Invalid bookingDate: {}", query.booking_date)))?;

    let drivers = state.drivers.find_available_for(date).await?;
    Ok(Json(drivers.iter().map(DriverView::from).collect()))
}

/// Body of `getAllUpcomingBooking`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpcomingRequest {
    /// Reference instant with offset, e.g. `2025-07-14T00:00:00+05:30`.
    pub today: String,
}

/// `POST /api/admin/getAllUpcomingBooking`.
///
/// The offset of `today` is dropped and its local date-time compared with
/// safari dates.
///
/// # Errors
///
/// 400 if `today` is not an RFC 3339 timestamp; 500 if the store fails.
pub async fn upcoming_bookings(
    State(state): State<AppState>,
    Json(request): Json<UpcomingRequest>,
) -> Result<Json<Vec<UpcomingBookingView>>, AppError> {
    let today = DateTime::parse_from_rfc3339(request.today.trim())
        .map_err(|_| AppError::bad_request(format!("Invalid today: {}", request.today)))?
        .naive_local();

    Ok(Json(state.lifecycle.list_upcoming(today).await?))
}

/// Optional body of `assign-driver`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDriverRequest {
    /// Driver to link to the booking.
    #[serde(default)]
    pub driver_id: Option<DriverId>,
}

/// `PUT /api/admin/bookings/{id}/assign-driver`.
///
/// 200 only when the confirmation went out. A 500 here means the assignment
/// is saved but nobody was notified.
///
/// # Errors
///
/// 500 `INTERNAL_SERVER_ERROR` if the store fails.
pub async fn assign_driver(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Option<Json<AssignDriverRequest>>,
) -> Result<TextResponse, AppError> {
    let driver = body.and_then(|Json(request)| request.driver_id);

    match state.lifecycle.assign_driver(BookingId(id), driver).await {
        Ok(AssignmentOutcome::Notified { .. }) => {
            Ok(text(StatusCode::OK, "Driver assigned and confirmation email sent"))
        }
        Ok(AssignmentOutcome::NoRecipient { .. }) => Ok(text(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Driver assigned, but no valid email found to send confirmation",
        )),
        Ok(AssignmentOutcome::NotificationFailed { reason, .. }) => Ok(text(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Driver assigned successfully, but failed to send confirmation email: {reason}"),
        )),
        Err(e @ (LifecycleError::NotFound(_) | LifecycleError::DriverNotFound(_))) => {
            Ok(text(StatusCode::NOT_FOUND, e.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// `GET /api/admin/getAllBooking`.
///
/// # Errors
///
/// 500 if the store fails.
pub async fn all_bookings(State(state): State<AppState>) -> Result<Json<Vec<BookingView>>, AppError> {
    Ok(Json(state.lifecycle.list_all().await?))
}

/// `PUT /api/admin/{bookingId}/cancel-booking`.
///
/// # Errors
///
/// 500 if the store fails.
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<TextResponse, AppError> {
    match state.lifecycle.cancel_booking(BookingId(id)).await {
        Ok(_) => Ok(text(StatusCode::OK, "Booking cancelled successfully")),
        Err(e @ LifecycleError::NotFound(_)) => Ok(text(StatusCode::NOT_FOUND, e.to_string())),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_local_date_time_parsing() {
        let expected = NaiveDate::from_ymd_opt(2025, 7, 14)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap();

        assert_eq!(parse_local_date_time("2025-07-14T06:30:00"), Some(expected));
        assert_eq!(parse_local_date_time("2025-07-14T06:30:00+05:30"), Some(expected));
        assert_eq!(parse_local_date_time("2025-07-14T06:30:00Z"), Some(expected));
        assert_eq!(parse_local_date_time("14/07/2025"), None);
    }
}
