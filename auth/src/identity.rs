//! Local identities and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identity ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role held by an identity. Exactly one per identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Back-office operator: assigns drivers, manages bookings.
    Admin,
    /// Fulfils trips.
    Driver,
    /// Books trips.
    Customer,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Driver, Self::Customer];

    /// Wire form of the role (`ADMIN`, `DRIVER`, `CUSTOMER`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Driver => "DRIVER",
            Self::Customer => "CUSTOMER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known role.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    /// Parses `ADMIN`, `admin` and `ROLE_ADMIN` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("ROLE_"))
            .map_or(trimmed, |_| &trimmed[5..]);

        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(bare))
            .ok_or_else(|| ParseRoleError(s.to_string()))
    }
}

/// A registered account.
///
/// Created at registration, by the admin bootstrap, or on the first
/// successful identity-provider sign-in. The role is never changed by the
/// authentication pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Identity ID.
    pub id: UserId,

    /// Email address (unique, compared case-insensitively).
    pub email: String,

    /// Display name.
    pub name: String,

    /// PHC-format password hash; absent for identity-provider-only accounts.
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    /// Role.
    pub role: Role,

    /// Identity-provider subject (`sub`) that provisioned this identity.
    pub external_subject: Option<String>,

    /// Account created timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert shape of an [`Identity`]; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// PHC-format password hash.
    pub password_hash: Option<String>,
    /// Role.
    pub role: Role,
    /// Identity-provider subject.
    pub external_subject: Option<String>,
}

impl NewIdentity {
    /// Create an insert shape with no password and no external subject.
    #[must_use]
    pub fn new(email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            password_hash: None,
            role,
            external_subject: None,
        }
    }

    /// Attach a password hash.
    #[must_use]
    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    /// Attach the identity-provider subject.
    #[must_use]
    pub fn with_external_subject(mut self, subject: impl Into<String>) -> Self {
        self.external_subject = Some(subject.into());
        self
    }

    /// Materialize into an [`Identity`] with the given id and creation time.
    #[must_use]
    pub fn into_identity(self, id: UserId, created_at: DateTime<Utc>) -> Identity {
        Identity {
            id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            role: self.role,
            external_subject: self.external_subject,
            created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parses_wire_and_prefixed_forms() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("driver".parse::<Role>().unwrap(), Role::Driver);
        assert_eq!("ROLE_CUSTOMER".parse::<Role>().unwrap(), Role::Customer);
        assert_eq!("role_admin".parse::<Role>().unwrap(), Role::Admin);
    }

    #[test]
    fn test_role_rejects_unknown() {
        assert_eq!(
            "GUIDE".parse::<Role>(),
            Err(ParseRoleError("GUIDE".to_string()))
        );
        assert!("ROLE_".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Driver).unwrap(), "\"DRIVER\"");
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let identity = NewIdentity::new("a@x.com", "A", Role::Customer)
            .with_password_hash("$argon2id$secret")
            .into_identity(UserId(1), Utc::now());

        let json = serde_json::to_string(&identity).unwrap();
        assert!(!json.contains("argon2id"));
    }
}
