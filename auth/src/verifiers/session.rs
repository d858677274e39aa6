//! Self-issued session tokens (HS256 JWT).

use super::CredentialVerifier;
use crate::constants::{DEFAULT_SESSION_ISSUER, DEFAULT_SESSION_TTL_SECS};
use crate::error::{AuthError, Result, VerificationFailure};
use crate::identity::{Identity, Role, UserId};
use crate::principal::{ResolvedIdentity, VerificationSource};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Claims embedded in a session token at issuance time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Local user id, as a decimal string.
    pub sub: String,
    /// Email at issuance.
    pub email: String,
    /// Display name at issuance.
    pub name: String,
    /// Role at issuance.
    pub role: Role,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
    /// Issuer.
    pub iss: String,
}

/// Session token settings shared by issuer and verifier.
#[derive(Clone)]
pub struct SessionTokenConfig {
    /// HMAC secret.
    pub secret: String,
    /// Value of the `iss` claim.
    pub issuer: String,
    /// Lifetime of issued tokens.
    pub ttl: Duration,
    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway_secs: u64,
}

impl SessionTokenConfig {
    /// Config with the default issuer, a 24h TTL and no leeway.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: DEFAULT_SESSION_ISSUER.to_string(),
            ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
            leeway_secs: 0,
        }
    }

    /// Override the issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Override the token lifetime.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Override the expiry leeway.
    #[must_use]
    pub const fn with_leeway_secs(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }
}

impl fmt::Debug for SessionTokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokenConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

/// A freshly minted session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    /// Encoded JWT.
    pub token: String,
    /// When the token stops verifying.
    pub expires_at: DateTime<Utc>,
}

/// Mints session tokens for authenticated identities.
#[derive(Clone)]
pub struct SessionTokenIssuer {
    config: SessionTokenConfig,
    key: EncodingKey,
}

impl SessionTokenIssuer {
    /// Create an issuer.
    #[must_use]
    pub fn new(config: SessionTokenConfig) -> Self {
        let key = EncodingKey::from_secret(config.secret.as_bytes());
        Self { config, key }
    }

    /// Issue a token for `identity`, valid from `now` for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenIssuance` if signing fails.
    pub fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<IssuedToken> {
        let expires_at = now + self.config.ttl;
        let claims = SessionClaims {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            role: identity.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.config.issuer.clone(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| AuthError::TokenIssuance(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }
}

/// Verifies self-issued session tokens.
///
/// Signature, expiry and issuer only. The embedded claims are trusted as of
/// issuance; no store is consulted.
#[derive(Clone)]
pub struct SessionTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionTokenVerifier {
    /// Create a verifier.
    #[must_use]
    pub fn new(config: &SessionTokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.leeway = config.leeway_secs;

        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl CredentialVerifier for SessionTokenVerifier {
    fn source(&self) -> VerificationSource {
        VerificationSource::SessionToken
    }

    async fn verify(&self, raw: &str) -> std::result::Result<ResolvedIdentity, VerificationFailure> {
        let header = jsonwebtoken::decode_header(raw).map_err(|_| VerificationFailure::Malformed)?;
        if header.alg != Algorithm::HS256 {
            return Err(VerificationFailure::Malformed);
        }

        let claims = jsonwebtoken::decode::<SessionClaims>(raw, &self.key, &self.validation)?.claims;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map(UserId)
            .map_err(|_| VerificationFailure::InvalidClaims(format!("non-numeric sub: {}", claims.sub)))?;

        Ok(ResolvedIdentity {
            user_id,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::identity::NewIdentity;

    const SECRET: &str = "session-secret-for-tests";

    fn identity() -> Identity {
        NewIdentity::new("driver@x.com", "Dana", Role::Driver)
            .into_identity(UserId(7), Utc::now())
    }

    #[tokio::test]
    async fn test_issue_then_verify() {
        let config = SessionTokenConfig::new(SECRET);
        let issued = SessionTokenIssuer::new(config.clone())
            .issue(&identity(), Utc::now())
            .unwrap();

        let resolved = SessionTokenVerifier::new(&config)
            .verify(&issued.token)
            .await
            .unwrap();

        assert_eq!(resolved.user_id, UserId(7));
        assert_eq!(resolved.role, Role::Driver);
        assert_eq!(resolved.email, "driver@x.com");
    }

    #[tokio::test]
    async fn test_expired_token() {
        let config = SessionTokenConfig::new(SECRET);
        let issued = SessionTokenIssuer::new(config.clone())
            .issue(&identity(), Utc::now() - Duration::days(2))
            .unwrap();

        let result = SessionTokenVerifier::new(&config).verify(&issued.token).await;

        assert_eq!(result, Err(VerificationFailure::Expired));
    }

    #[tokio::test]
    async fn test_wrong_secret_is_signature_mismatch() {
        let issued = SessionTokenIssuer::new(SessionTokenConfig::new("other-secret"))
            .issue(&identity(), Utc::now())
            .unwrap();

        let result = SessionTokenVerifier::new(&SessionTokenConfig::new(SECRET))
            .verify(&issued.token)
            .await;

        assert_eq!(result, Err(VerificationFailure::InvalidSignature));
    }

    #[tokio::test]
    async fn test_foreign_issuer_is_invalid_claims() {
        let issued = SessionTokenIssuer::new(SessionTokenConfig::new(SECRET).with_issuer("elsewhere"))
            .issue(&identity(), Utc::now())
            .unwrap();

        let result = SessionTokenVerifier::new(&SessionTokenConfig::new(SECRET))
            .verify(&issued.token)
            .await;

        assert!(matches!(result, Err(VerificationFailure::InvalidClaims(_))));
    }

    #[tokio::test]
    async fn test_garbage_is_malformed() {
        let verifier = SessionTokenVerifier::new(&SessionTokenConfig::new(SECRET));

        assert_eq!(verifier.verify("not.a.jwt").await, Err(VerificationFailure::Malformed));
        assert_eq!(verifier.verify("").await, Err(VerificationFailure::Malformed));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", SessionTokenConfig::new(SECRET));

        assert!(!rendered.contains(SECRET));
        assert!(rendered.contains("<redacted>"));
    }
}
