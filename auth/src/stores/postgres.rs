//! PostgreSQL identity store.
//!
//! # Example
//!
//! ```no_run
//! use wildtrails_auth::stores::PostgresIdentityStore;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/wildtrails").await?;
//! let store = PostgresIdentityStore::new(pool);
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::identity::{Identity, NewIdentity, Role, UserId};
use crate::providers::IdentityStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const SELECT_COLUMNS: &str =
    "SELECT id, email, name, password_hash, role, external_subject, created_at FROM identities";

/// PostgreSQL identity store.
#[derive(Clone)]
pub struct PostgresIdentityStore {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresIdentityStore {
    /// Create a new PostgreSQL identity store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// Other crates keep their own migrations in the same database, so
    /// versions applied by them are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        let mut migrator = sqlx::migrate!("./migrations");
        migrator.set_ignore_missing(true);
        migrator
            .run(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }
}

fn database_error(context: &str, e: &sqlx::Error) -> AuthError {
    AuthError::DatabaseError(format!("{context}: {e}"))
}

fn identity_from_row(row: &PgRow) -> Result<Identity> {
    let decode = |e: sqlx::Error| database_error("Failed to decode identity row", &e);

    let role: String = row.try_get("role").map_err(decode)?;
    let role = role
        .parse::<Role>()
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

    Ok(Identity {
        id: UserId(row.try_get("id").map_err(decode)?),
        email: row.try_get("email").map_err(decode)?,
        name: row.try_get("name").map_err(decode)?,
        password_hash: row.try_get("password_hash").map_err(decode)?,
        role,
        external_subject: row.try_get("external_subject").map_err(decode)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(decode)?,
    })
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to get identity", &e))?;

        row.as_ref().map(identity_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE lower(email) = lower($1)"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("Failed to get identity", &e))?;

        row.as_ref().map(identity_from_row).transpose()
    }

    async fn create(&self, new: NewIdentity) -> Result<Identity> {
        let row = sqlx::query(
            r"
            INSERT INTO identities (email, name, password_hash, role, external_subject)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, name, password_hash, role, external_subject, created_at
            ",
        )
        .bind(&new.email)
        .bind(&new.name)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .bind(&new.external_subject)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AuthError::Conflict(format!("email already registered: {}", new.email))
            }
            _ => database_error("Failed to create identity", &e),
        })?;

        identity_from_row(&row)
    }
}
