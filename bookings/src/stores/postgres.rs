//! PostgreSQL booking store and driver directory.
//!
//! Both share one pool. Customer, driver and package names are read through
//! joins on every query; the booking row only stores foreign keys.

use crate::error::{BookingError, Result};
use crate::model::{
    Booking, BookingId, CustomerId, CustomerLink, Driver, DriverId, DriverLink, NewDriver,
    PackageId, PackageRef, PersonRef,
};
use crate::providers::{BookingStore, DriverDirectory};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::str::FromStr;
use wildtrails_auth::UserId;

const SELECT_BOOKINGS: &str = r"
    SELECT b.id, b.status, b.driver_status, b.payment_status, b.booking_date, b.safari_date,
           b.pickup_location, b.num_adults, b.total_amount,
           b.guest_name, b.guest_email, b.guest_phone, b.updated_at,
           c.id  AS customer_id,
           cu.id AS customer_user_id, cu.name AS customer_name, cu.email AS customer_email,
           d.id  AS driver_id,
           du.id AS driver_user_id, du.name AS driver_name, du.email AS driver_email,
           p.id  AS package_id, p.name AS package_name
    FROM bookings b
    LEFT JOIN customers  c  ON c.id  = b.customer_id
    LEFT JOIN identities cu ON cu.id = c.user_id
    LEFT JOIN drivers    d  ON d.id  = b.driver_id
    LEFT JOIN identities du ON du.id = d.user_id
    LEFT JOIN packages   p  ON p.id  = b.package_id
";

const SELECT_DRIVERS: &str = r"
    SELECT d.id, d.vehicle_type, d.photo_url, d.is_available,
           u.id AS user_id, u.name, u.email
    FROM drivers d
    JOIN identities u ON u.id = d.user_id
";

/// Run the booking migrations.
///
/// The identity migrations must have run first.
///
/// # Errors
///
/// Returns error if migrations fail.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    let mut migrator = sqlx::migrate!("./migrations");
    migrator.set_ignore_missing(true);
    migrator
        .run(pool)
        .await
        .map_err(|e| BookingError::DatabaseError(format!("Migration failed: {e}")))
}

fn database_error(context: &str, e: &sqlx::Error) -> BookingError {
    BookingError::DatabaseError(format!("{context}: {e}"))
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| database_error(&format!("Failed to decode column {column}"), &e))
}

fn parse<T: FromStr>(row: &PgRow, column: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw: String = get(row, column)?;
    raw.parse::<T>()
        .map_err(|e| BookingError::InvalidData(format!("{column}: {e}")))
}

fn person(row: &PgRow, prefix: &str) -> Result<Option<PersonRef>> {
    let Some(user_id) = get::<Option<i64>>(row, &format!("{prefix}_user_id"))? else {
        return Ok(None);
    };
    Ok(Some(PersonRef {
        user_id: UserId(user_id),
        name: get(row, &format!("{prefix}_name"))?,
        email: get(row, &format!("{prefix}_email"))?,
    }))
}

fn booking_from_row(row: &PgRow) -> Result<Booking> {
    let customer = get::<Option<i64>>(row, "customer_id")?
        .map(|id| {
            Ok::<_, BookingError>(CustomerLink {
                id: CustomerId(id),
                user: person(row, "customer")?,
            })
        })
        .transpose()?;
    let driver = get::<Option<i64>>(row, "driver_id")?
        .map(|id| {
            Ok::<_, BookingError>(DriverLink {
                id: DriverId(id),
                user: person(row, "driver")?,
            })
        })
        .transpose()?;
    let package = get::<Option<i64>>(row, "package_id")?
        .map(|id| {
            Ok::<_, BookingError>(PackageRef {
                id: PackageId(id),
                name: get(row, "package_name")?,
            })
        })
        .transpose()?;

    Ok(Booking {
        id: BookingId(get(row, "id")?),
        status: parse(row, "status")?,
        driver_status: parse(row, "driver_status")?,
        payment_status: parse(row, "payment_status")?,
        booking_date: get::<Option<NaiveDateTime>>(row, "booking_date")?,
        safari_date: get(row, "safari_date")?,
        pickup_location: get(row, "pickup_location")?,
        num_adults: get(row, "num_adults")?,
        total_amount: get(row, "total_amount")?,
        customer,
        guest_name: get(row, "guest_name")?,
        guest_email: get(row, "guest_email")?,
        guest_phone: get(row, "guest_phone")?,
        driver,
        package,
        updated_at: get::<Option<DateTime<Utc>>>(row, "updated_at")?,
    })
}

fn driver_from_row(row: &PgRow) -> Result<Driver> {
    Ok(Driver {
        id: DriverId(get(row, "id")?),
        user: PersonRef {
            user_id: UserId(get(row, "user_id")?),
            name: get(row, "name")?,
            email: get(row, "email")?,
        },
        vehicle_type: get(row, "vehicle_type")?,
        photo_url: get(row, "photo_url")?,
        is_available: get(row, "is_available")?,
    })
}

/// PostgreSQL booking store.
#[derive(Clone)]
pub struct PostgresBookingStore {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresBookingStore {
    /// Create a new PostgreSQL booking store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>> {
        let row = sqlx::query(&format!("{SELECT_BOOKINGS} WHERE b.id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to get booking", &e))?;

        row.as_ref().map(booking_from_row).transpose()
    }

    async fn save(&self, booking: &Booking) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO bookings (
                id, status, driver_status, payment_status, booking_date, safari_date,
                pickup_location, num_adults, total_amount, customer_id,
                guest_name, guest_email, guest_phone, driver_id, package_id, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (id) DO UPDATE SET
                status          = EXCLUDED.status,
                driver_status   = EXCLUDED.driver_status,
                payment_status  = EXCLUDED.payment_status,
                booking_date    = EXCLUDED.booking_date,
                safari_date     = EXCLUDED.safari_date,
                pickup_location = EXCLUDED.pickup_location,
                num_adults      = EXCLUDED.num_adults,
                total_amount    = EXCLUDED.total_amount,
                customer_id     = EXCLUDED.customer_id,
                guest_name      = EXCLUDED.guest_name,
                guest_email     = EXCLUDED.guest_email,
                guest_phone     = EXCLUDED.guest_phone,
                driver_id       = EXCLUDED.driver_id,
                package_id      = EXCLUDED.package_id,
                updated_at      = EXCLUDED.updated_at
            ",
        )
        .bind(booking.id.0)
        .bind(booking.status.as_str())
        .bind(booking.driver_status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.booking_date)
        .bind(booking.safari_date)
        .bind(&booking.pickup_location)
        .bind(booking.num_adults)
        .bind(booking.total_amount)
        .bind(booking.customer.as_ref().map(|customer| customer.id.0))
        .bind(&booking.guest_name)
        .bind(&booking.guest_email)
        .bind(&booking.guest_phone)
        .bind(booking.driver.as_ref().map(|driver| driver.id.0))
        .bind(booking.package.as_ref().map(|package| package.id.0))
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to save booking", &e))?;

        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Booking>> {
        let rows = sqlx::query(&format!("{SELECT_BOOKINGS} ORDER BY b.id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("Failed to list bookings", &e))?;

        rows.iter().map(booking_from_row).collect()
    }

    async fn find_by_safari_date_after(&self, reference: NaiveDateTime) -> Result<Vec<Booking>> {
        let rows = sqlx::query(&format!(
            "{SELECT_BOOKINGS} WHERE b.safari_date > $1 ORDER BY b.safari_date, b.id"
        ))
        .bind(reference)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list upcoming bookings", &e))?;

        rows.iter().map(booking_from_row).collect()
    }
}

/// PostgreSQL driver directory.
#[derive(Clone)]
pub struct PostgresDriverDirectory {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresDriverDirectory {
    /// Create a new PostgreSQL driver directory.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriverDirectory for PostgresDriverDirectory {
    async fn register(&self, driver: NewDriver) -> Result<Driver> {
        let row = sqlx::query(
            r"
            INSERT INTO drivers (user_id, vehicle_type, photo_url, is_available)
            VALUES ($1, $2, $3, TRUE)
            RETURNING id
            ",
        )
        .bind(driver.user.user_id.0)
        .bind(&driver.vehicle_type)
        .bind(&driver.photo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => BookingError::Conflict(
                format!("user {} already has a driver profile", driver.user.user_id),
            ),
            _ => database_error("Failed to register driver", &e),
        })?;

        Ok(driver.into_driver(DriverId(get(&row, "id")?)))
    }

    async fn find_by_id(&self, id: DriverId) -> Result<Option<Driver>> {
        let row = sqlx::query(&format!("{SELECT_DRIVERS} WHERE d.id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to get driver", &e))?;

        row.as_ref().map(driver_from_row).transpose()
    }

    async fn find_available_for(&self, date: NaiveDateTime) -> Result<Vec<Driver>> {
        let rows = sqlx::query(&format!(
            r"
            {SELECT_DRIVERS}
            WHERE d.is_available
              AND NOT EXISTS (
                  SELECT 1 FROM bookings b
                  WHERE b.driver_id = d.id
                    AND b.status <> 'cancelled'
                    AND b.safari_date::date = $1
              )
            ORDER BY d.id
            "
        ))
        .bind(date.date())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("Failed to list available drivers", &e))?;

        rows.iter().map(driver_from_row).collect()
    }
}
