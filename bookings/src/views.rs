//! Transport views of bookings and drivers.
//!
//! Read projections only. Field names follow what the admin dashboard reads.

// Fields are documented by their JSON keys.
#![allow(missing_docs)]

use crate::model::{
    Booking, BookingId, BookingStatus, Driver, DriverId, DriverStatus, PaymentStatus,
};
use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::Serialize;

/// Upcoming-safari row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingBookingView {
    pub id: BookingId,
    pub booking_date: Option<String>,
    pub booking_time: Option<String>,
    pub status: BookingStatus,
    pub customer_name: String,
    pub driver_name: String,
    pub guest_user_name: Option<String>,
    pub guest_user_email: Option<String>,
    pub guest_user_phone: Option<String>,
    pub num_adults: Option<i32>,
    pub safari_date: NaiveDateTime,
    pub pickup_location: Option<String>,
    pub total_amount: Option<f64>,
    pub payment_status: PaymentStatus,
    pub updated_at: Option<DateTime<Utc>>,
    pub driver_status: DriverStatus,
    pub package_name: Option<String>,
}

/// Row of the full booking list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: BookingId,
    pub booking_date: Option<String>,
    pub booking_time: Option<String>,
    pub status: BookingStatus,
    pub customer_name: String,
    pub driver_name: String,
    pub guest_user_name: Option<String>,
    pub guest_user_email: Option<String>,
    pub guest_user_phone: Option<String>,
    pub total_amount: Option<f64>,
    pub payment_status: PaymentStatus,
    pub driver_status: DriverStatus,
    pub package_name: Option<String>,
}

/// Driver offered for assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverView {
    pub id: DriverId,
    pub name: String,
    #[serde(rename = "isAvailable")]
    pub is_available: bool,
    pub vehicle_type: Option<String>,
    pub photo_url: Option<String>,
}

fn split_booking_date(booking: &Booking) -> (Option<String>, Option<String>) {
    booking.booking_date.map_or((None, None), |stamp| {
        (
            Some(stamp.date().format("%Y-%m-%d").to_string()),
            Some(format_time(stamp.time())),
        )
    })
}

/// `HH:MM`, with seconds and fraction only when non-zero.
fn format_time(time: NaiveTime) -> String {
    let nanos = time.nanosecond();
    let pattern = if nanos == 0 {
        if time.second() == 0 { "%H:%M" } else { "%H:%M:%S" }
    } else if nanos % 1_000_000 == 0 {
        "%H:%M:%S%.3f"
    } else if nanos % 1_000 == 0 {
        "%H:%M:%S%.6f"
    } else {
        "%H:%M:%S%.9f"
    };
    time.format(pattern).to_string()
}

impl From<&Booking> for UpcomingBookingView {
    fn from(booking: &Booking) -> Self {
        let (booking_date, booking_time) = split_booking_date(booking);
        Self {
            id: booking.id,
            booking_date,
            booking_time,
            status: booking.status,
            customer_name: booking.customer_name().unwrap_or_default().to_string(),
            driver_name: booking.driver_name().unwrap_or_default().to_string(),
            guest_user_name: booking.guest_name.clone(),
            guest_user_email: booking.guest_email.clone(),
            guest_user_phone: booking.guest_phone.clone(),
            num_adults: booking.num_adults,
            safari_date: booking.safari_date,
            pickup_location: booking.pickup_location.clone(),
            total_amount: booking.total_amount,
            payment_status: booking.payment_status,
            updated_at: booking.updated_at,
            driver_status: booking.driver_status,
            package_name: booking.package.as_ref().map(|package| package.name.clone()),
        }
    }
}

impl From<&Booking> for BookingView {
    fn from(booking: &Booking) -> Self {
        let (booking_date, booking_time) = split_booking_date(booking);
        Self {
            id: booking.id,
            booking_date,
            booking_time,
            status: booking.status,
            customer_name: booking.customer_name().unwrap_or_default().to_string(),
            driver_name: booking.driver_name().unwrap_or_default().to_string(),
            guest_user_name: booking.guest_name.clone(),
            guest_user_email: booking.guest_email.clone(),
            guest_user_phone: booking.guest_phone.clone(),
            total_amount: booking.total_amount,
            payment_status: booking.payment_status,
            driver_status: booking.driver_status,
            package_name: booking.package.as_ref().map(|package| package.name.clone()),
        }
    }
}

impl From<&Driver> for DriverView {
    fn from(driver: &Driver) -> Self {
        Self {
            id: driver.id,
            name: driver.user.name.clone(),
            is_available: driver.is_available,
            vehicle_type: driver.vehicle_type.clone(),
            photo_url: driver.photo_url.clone(),
        }
    }
}
