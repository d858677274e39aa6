//! Booking and driver model.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use wildtrails_auth::UserId;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(
    /// Booking identifier.
    BookingId
);
id_newtype!(
    /// Driver identifier (not the driver's user id).
    DriverId
);
id_newtype!(
    /// Customer profile identifier.
    CustomerId
);
id_newtype!(
    /// Tour package identifier.
    PackageId
);

/// A status string that is not one of the known values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Wire form.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseStatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(ParseStatusError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

status_enum!(
    /// Reservation status.
    BookingStatus, "booking status" {
        /// Accepted, awaiting a driver.
        Pending => "pending",
        /// Driver assigned.
        Confirmed => "confirmed",
        /// Terminal. Bookings are never deleted.
        Cancelled => "cancelled",
    }
);

status_enum!(
    /// Driver assignment status.
    DriverStatus, "driver status" {
        /// No driver yet.
        Unassigned => "unassigned",
        /// A driver has been assigned.
        Assigned => "assigned",
    }
);

status_enum!(
    /// Payment status.
    PaymentStatus, "payment status" {
        /// Not yet paid.
        Pending => "pending",
        /// Paid in full.
        Paid => "paid",
        /// Payment attempt failed.
        Failed => "failed",
        /// Payment returned.
        Refunded => "refunded",
    }
);

/// Read-only view of the user account behind a customer or driver profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    /// Account id.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
}

/// Registered customer linked to a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerLink {
    /// Customer profile id.
    pub id: CustomerId,
    /// The customer's account, when it still exists.
    pub user: Option<PersonRef>,
}

/// Driver assigned to a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverLink {
    /// Driver id.
    pub id: DriverId,
    /// The driver's account, when it still exists.
    pub user: Option<PersonRef>,
}

/// Tour package booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    /// Package id.
    pub id: PackageId,
    /// Package display name.
    pub name: String,
}

/// A safari reservation.
///
/// Guest contact fields are used when no registered customer is linked. Both
/// may be present; see [`crate::recipient::resolve_recipient`] for which one
/// is contacted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking id.
    pub id: BookingId,
    /// Reservation status.
    pub status: BookingStatus,
    /// Driver assignment status.
    pub driver_status: DriverStatus,
    /// Payment status.
    pub payment_status: PaymentStatus,
    /// When the reservation was made (local time).
    pub booking_date: Option<NaiveDateTime>,
    /// When the safari takes place (local time).
    pub safari_date: NaiveDateTime,
    /// Pickup point.
    pub pickup_location: Option<String>,
    /// Adults in the party.
    pub num_adults: Option<i32>,
    /// Total price.
    pub total_amount: Option<f64>,
    /// Linked registered customer.
    pub customer: Option<CustomerLink>,
    /// Guest contact name.
    pub guest_name: Option<String>,
    /// Guest contact email.
    pub guest_email: Option<String>,
    /// Guest contact phone.
    pub guest_phone: Option<String>,
    /// Assigned driver.
    pub driver: Option<DriverLink>,
    /// Booked package.
    pub package: Option<PackageRef>,
    /// Last lifecycle change.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// A pending, unassigned, unpaid booking for `safari_date`.
    #[must_use]
    pub const fn new(id: BookingId, safari_date: NaiveDateTime) -> Self {
        Self {
            id,
            status: BookingStatus::Pending,
            driver_status: DriverStatus::Unassigned,
            payment_status: PaymentStatus::Pending,
            booking_date: None,
            safari_date,
            pickup_location: None,
            num_adults: None,
            total_amount: None,
            customer: None,
            guest_name: None,
            guest_email: None,
            guest_phone: None,
            driver: None,
            package: None,
            updated_at: None,
        }
    }

    /// Display name of the linked customer, if any.
    #[must_use]
    pub fn customer_name(&self) -> Option<&str> {
        self.customer
            .as_ref()
            .and_then(|customer| customer.user.as_ref())
            .map(|user| user.name.as_str())
    }

    /// Display name of the assigned driver, if any.
    #[must_use]
    pub fn driver_name(&self) -> Option<&str> {
        self.driver
            .as_ref()
            .and_then(|driver| driver.user.as_ref())
            .map(|user| user.name.as_str())
    }
}

/// A registered driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    /// Driver id.
    pub id: DriverId,
    /// The driver's account.
    pub user: PersonRef,
    /// Vehicle description.
    pub vehicle_type: Option<String>,
    /// Photo path or URL.
    pub photo_url: Option<String>,
    /// Whether the driver accepts assignments at all.
    pub is_available: bool,
}

impl Driver {
    /// Link used when assigning this driver to a booking.
    #[must_use]
    pub fn link(&self) -> DriverLink {
        DriverLink {
            id: self.id,
            user: Some(self.user.clone()),
        }
    }
}

/// Insert-shape of a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDriver {
    /// The driver's (already created) account.
    pub user: PersonRef,
    /// Vehicle description.
    pub vehicle_type: Option<String>,
    /// Photo path or URL.
    pub photo_url: Option<String>,
}

impl NewDriver {
    /// Complete the row with its id. New drivers start available.
    #[must_use]
    pub fn into_driver(self, id: DriverId) -> Driver {
        Driver {
            id,
            user: self.user,
            vehicle_type: self.vehicle_type,
            photo_url: self.photo_url,
            is_available: true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_forms() {
        assert_eq!(serde_json::to_string(&BookingStatus::Cancelled).unwrap(), "\"cancelled\"");
        assert_eq!("Confirmed".parse::<BookingStatus>().unwrap(), BookingStatus::Confirmed);
        assert_eq!(" assigned ".parse::<DriverStatus>().unwrap(), DriverStatus::Assigned);
        assert_eq!(PaymentStatus::Refunded.to_string(), "refunded");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = "teleported".parse::<DriverStatus>().unwrap_err();

        assert_eq!(err.to_string(), "unknown driver status: teleported");
    }

    #[test]
    fn test_names_follow_links() {
        let date = NaiveDateTime::parse_from_str("2025-03-01 06:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let mut booking = Booking::new(BookingId(1), date);
        assert_eq!(booking.customer_name(), None);

        booking.customer = Some(CustomerLink { id: CustomerId(3), user: None });
        assert_eq!(booking.customer_name(), None);

        booking.driver = Some(DriverLink {
            id: DriverId(2),
            user: Some(PersonRef {
                user_id: UserId(9),
                name: "Kamal".to_string(),
                email: "kamal@x.com".to_string(),
            }),
        });
        assert_eq!(booking.driver_name(), Some("Kamal"));
    }
}
