//! Error types for authentication and authorization operations.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failures of the identity store, token issuance and password primitives.
///
/// Credential verification has its own taxonomy, [`VerificationFailure`],
/// because verification failures are never surfaced to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Email/password pair did not match a stored identity.
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ═══════════════════════════════════════════════════════════
    // Storage Errors
    // ═══════════════════════════════════════════════════════════

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    // ═══════════════════════════════════════════════════════════
    // Primitive Errors
    // ═══════════════════════════════════════════════════════════

    /// Signing a session token failed.
    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    /// Hashing a password failed.
    #[error("Password hashing failed: {0}")]
    PasswordHashing(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Returns `true` if this error was caused by a uniqueness violation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use wildtrails_auth::AuthError;
    /// assert!(AuthError::Conflict("email".into()).is_conflict());
    /// assert!(!AuthError::InvalidCredentials.is_conflict());
    /// ```
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Why a credential verifier declined a token.
///
/// Every variant is non-fatal: the gateway moves on to the next verifier, and
/// if none accepts the token the request continues anonymously.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    /// Token could not be parsed, or is not in this verifier's format.
    #[error("malformed token")]
    Malformed,

    /// Token is past its `exp` claim.
    #[error("token expired")]
    Expired,

    /// Signature did not verify against any trusted key.
    #[error("signature mismatch")]
    InvalidSignature,

    /// Issuer, audience or a required claim is wrong or missing.
    #[error("invalid claims: {0}")]
    InvalidClaims(String),

    /// Token is valid but maps to no local identity and provisioning is off.
    #[error("unknown subject")]
    UnknownSubject,

    /// A collaborator (key set, identity store) could not be reached.
    #[error("verifier unavailable: {0}")]
    Unavailable(String),
}

impl From<jsonwebtoken::errors::Error> for VerificationFailure {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => Self::InvalidClaims(err.to_string()),
            _ => Self::Malformed,
        }
    }
}

impl From<AuthError> for VerificationFailure {
    fn from(err: AuthError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_collapses_to_unavailable() {
        let failure = VerificationFailure::from(AuthError::DatabaseError("down".into()));
        assert_eq!(
            failure,
            VerificationFailure::Unavailable("Database error: down".into())
        );
    }

    #[test]
    fn test_jwt_expiry_maps_to_expired() {
        let err = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::ExpiredSignature,
        );
        assert_eq!(VerificationFailure::from(err), VerificationFailure::Expired);
    }

    #[test]
    fn test_jwt_garbage_maps_to_malformed() {
        let err = jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidToken);
        assert_eq!(VerificationFailure::from(err), VerificationFailure::Malformed);
    }
}
