//! # Wild Trails Testing
//!
//! Fixtures shared by the Wild Trails test suites.
//!
//! This crate provides:
//! - A fixed clock for deterministic lifecycle timestamps
//! - Builders for bookings and drivers
//! - Token minting for both credential formats
//!
//! ## Example
//!
//! ```ignore
//! use wildtrails_testing::{BookingBuilder, test_clock};
//!
//! #[tokio::test]
//! async fn test_assign() {
//!     let store = InMemoryBookingStore::with_bookings([
//!         BookingBuilder::new(1).guest_email("g@x.com").build(),
//!     ]);
//!     // ...
//! }
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use wildtrails_bookings::Clock;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use wildtrails_testing::mocks::FixedClock;
    /// use wildtrails_bookings::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Builders for domain fixtures.
pub mod builders {
    use super::{NaiveDate, NaiveDateTime};
    use wildtrails_auth::UserId;
    use wildtrails_bookings::{
        Booking, BookingId, BookingStatus, CustomerId, CustomerLink, Driver, DriverId,
        DriverLink, DriverStatus, PackageId, PackageRef, PersonRef,
    };

    /// Local date-time at 06:00 on the given day.
    ///
    /// # Panics
    ///
    /// Panics on an invalid calendar date.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn safari_day(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(6, 0, 0))
            .expect("valid fixture date")
    }

    /// A user reference with a derived email.
    #[must_use]
    pub fn person(user_id: i64, name: &str) -> PersonRef {
        PersonRef {
            user_id: UserId(user_id),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    /// Builder for [`Booking`] fixtures.
    ///
    /// Defaults: pending, unassigned, safari on 2025-02-01 06:00, no contact.
    #[derive(Debug, Clone)]
    pub struct BookingBuilder {
        booking: Booking,
    }

    impl BookingBuilder {
        /// Start a booking with the given id.
        #[must_use]
        pub fn new(id: i64) -> Self {
            Self {
                booking: Booking::new(BookingId(id), safari_day(2025, 2, 1)),
            }
        }

        /// Set the safari date.
        #[must_use]
        pub const fn safari_date(mut self, date: NaiveDateTime) -> Self {
            self.booking.safari_date = date;
            self
        }

        /// Set the reservation timestamp.
        #[must_use]
        pub const fn booking_date(mut self, date: NaiveDateTime) -> Self {
            self.booking.booking_date = Some(date);
            self
        }

        /// Set the status.
        #[must_use]
        pub const fn status(mut self, status: BookingStatus) -> Self {
            self.booking.status = status;
            self
        }

        /// Set guest contact details.
        #[must_use]
        pub fn guest(mut self, name: &str, email: &str) -> Self {
            self.booking.guest_name = Some(name.to_string());
            self.booking.guest_email = Some(email.to_string());
            self
        }

        /// Set only the guest email.
        #[must_use]
        pub fn guest_email(mut self, email: &str) -> Self {
            self.booking.guest_email = Some(email.to_string());
            self
        }

        /// Link a registered customer.
        #[must_use]
        pub fn customer(mut self, id: i64, user: PersonRef) -> Self {
            self.booking.customer = Some(CustomerLink {
                id: CustomerId(id),
                user: Some(user),
            });
            self
        }

        /// Assign a driver.
        #[must_use]
        pub fn driver(mut self, id: i64, user: PersonRef) -> Self {
            self.booking.driver = Some(DriverLink {
                id: DriverId(id),
                user: Some(user),
            });
            self.booking.driver_status = DriverStatus::Assigned;
            self
        }

        /// Link a package.
        #[must_use]
        pub fn package(mut self, id: i64, name: &str) -> Self {
            self.booking.package = Some(PackageRef {
                id: PackageId(id),
                name: name.to_string(),
            });
            self
        }

        /// Set the total price.
        #[must_use]
        pub const fn total_amount(mut self, amount: f64) -> Self {
            self.booking.total_amount = Some(amount);
            self
        }

        /// Finish.
        #[must_use]
        pub fn build(self) -> Booking {
            self.booking
        }
    }

    /// An available driver fixture.
    #[must_use]
    pub fn driver(id: i64, user: PersonRef) -> Driver {
        Driver {
            id: DriverId(id),
            user,
            vehicle_type: Some("Jeep".to_string()),
            photo_url: None,
            is_available: true,
        }
    }
}

/// Token minting for both credential formats.
pub mod tokens {
    use chrono::Utc;
    use wildtrails_auth::{Identity, SessionTokenConfig, SessionTokenIssuer};

    pub use wildtrails_auth::mocks::keys::{
        TEST_KID, mint_provider_token, mint_provider_token_with, test_key_source,
    };

    /// HMAC secret used by test session tokens.
    pub const TEST_SESSION_SECRET: &str = "wildtrails-test-session-secret";

    /// Identity-provider project id used by test provider tokens.
    pub const TEST_PROJECT_ID: &str = "wildtrails-test";

    /// Session config matching [`mint_session_token`].
    #[must_use]
    pub fn test_session_config() -> SessionTokenConfig {
        SessionTokenConfig::new(TEST_SESSION_SECRET)
    }

    /// A valid session token for `identity`, issued now.
    ///
    /// # Panics
    ///
    /// Panics if signing fails.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn mint_session_token(identity: &Identity) -> String {
        SessionTokenIssuer::new(test_session_config())
            .issue(identity, Utc::now())
            .expect("HS256 signing with a static secret")
            .token
    }

    /// A valid provider token for [`TEST_PROJECT_ID`], issued now.
    ///
    /// # Panics
    ///
    /// Panics if signing fails.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn mint_test_provider_token(sub: &str, email: &str) -> String {
        mint_provider_token(TEST_PROJECT_ID, sub, email, Utc::now())
            .expect("RS256 signing with the bundled test key")
    }
}

// Re-export commonly used items
pub use builders::{BookingBuilder, person, safari_day};
pub use mocks::{FixedClock, test_clock};
pub use tokens::{mint_session_token, mint_test_provider_token};
