//! Third-party identity-provider tokens (Firebase ID-token conventions).

use super::CredentialVerifier;
use crate::constants::identity_provider::ISSUER_PREFIX;
use crate::error::VerificationFailure;
use crate::identity::{NewIdentity, Role};
use crate::principal::{ResolvedIdentity, VerificationSource};
use crate::providers::{IdentityStore, KeySource, provision_identity};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, Validation};
use serde::Deserialize;
use std::sync::Arc;

/// Claims read from a provider ID token.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderClaims {
    /// Provider-specific subject.
    pub sub: String,
    /// Account email.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name, when the provider knows one.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the provider verified the email.
    #[serde(default)]
    pub email_verified: bool,
}

/// Identity-provider verifier settings.
#[derive(Debug, Clone)]
pub struct IdentityProviderConfig {
    /// Provider project id; the expected audience.
    pub project_id: String,
    /// Create local identities for unknown, verified subjects.
    pub provisioning: bool,
    /// Accepted signing algorithms.
    pub algorithms: Vec<Algorithm>,
    /// Role given to provisioned identities.
    pub default_role: Role,
    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway_secs: u64,
}

impl IdentityProviderConfig {
    /// RS256, provisioning enabled, new identities get [`Role::Customer`].
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            provisioning: true,
            algorithms: vec![Algorithm::RS256],
            default_role: Role::Customer,
            leeway_secs: 0,
        }
    }

    /// Enable or disable first-sign-in provisioning.
    #[must_use]
    pub const fn with_provisioning(mut self, provisioning: bool) -> Self {
        self.provisioning = provisioning;
        self
    }

    /// Expected `iss` claim.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!("{ISSUER_PREFIX}{}", self.project_id)
    }
}

/// Verifies provider-issued ID tokens and maps them to local identities.
pub struct IdentityProviderVerifier {
    config: IdentityProviderConfig,
    keys: Arc<dyn KeySource>,
    identities: Arc<dyn IdentityStore>,
}

impl IdentityProviderVerifier {
    /// Create a verifier.
    #[must_use]
    pub fn new(
        config: IdentityProviderConfig,
        keys: Arc<dyn KeySource>,
        identities: Arc<dyn IdentityStore>,
    ) -> Self {
        Self {
            config,
            keys,
            identities,
        }
    }

    /// Check signature, expiry, issuer and audience; return the claims.
    ///
    /// # Errors
    ///
    /// Returns the failure kind for any token this verifier does not accept.
    pub async fn decode(&self, raw: &str) -> Result<ProviderClaims, VerificationFailure> {
        let header = jsonwebtoken::decode_header(raw).map_err(|_| VerificationFailure::Malformed)?;
        if !self.config.algorithms.contains(&header.alg) {
            return Err(VerificationFailure::Malformed);
        }
        let kid = header.kid.ok_or(VerificationFailure::Malformed)?;

        let key = self.keys.decoding_key(&kid).await?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_audience(&[self.config.project_id.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.leeway = self.config.leeway_secs;

        let claims = jsonwebtoken::decode::<ProviderClaims>(raw, &key, &validation)?.claims;
        if claims.sub.is_empty() {
            return Err(VerificationFailure::InvalidClaims("empty sub".to_string()));
        }
        Ok(claims)
    }
}

#[async_trait]
impl CredentialVerifier for IdentityProviderVerifier {
    fn source(&self) -> VerificationSource {
        VerificationSource::IdentityProvider
    }

    async fn verify(&self, raw: &str) -> Result<ResolvedIdentity, VerificationFailure> {
        let claims = self.decode(raw).await?;
        if !claims.email_verified {
            tracing::debug!(sub = %claims.sub, "Provider token carries an unverified email");
            return Err(VerificationFailure::InvalidClaims("email not verified".to_string()));
        }

        let email = claims
            .email
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| VerificationFailure::InvalidClaims("missing email".to_string()))?;

        if let Some(identity) = self.identities.find_by_email(&email).await? {
            return Ok(ResolvedIdentity::from(&identity));
        }

        if !self.config.provisioning {
            tracing::debug!(sub = %claims.sub, "Verified provider token for unknown subject");
            return Err(VerificationFailure::UnknownSubject);
        }

        let name = claims.name.unwrap_or_else(|| email.clone());
        let new = NewIdentity::new(email, name, self.config.default_role)
            .with_external_subject(claims.sub);
        let identity = provision_identity(self.identities.as_ref(), new).await?;

        Ok(ResolvedIdentity::from(&identity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::identity::UserId;
    use crate::mocks::{InMemoryIdentityStore, keys};
    use crate::providers::StaticKeySource;
    use chrono::Utc;
    use jsonwebtoken::{DecodingKey, EncodingKey, Header};

    const PROJECT: &str = "wildtrails-test";

    fn verifier(store: &InMemoryIdentityStore, provisioning: bool) -> IdentityProviderVerifier {
        IdentityProviderVerifier::new(
            IdentityProviderConfig::new(PROJECT).with_provisioning(provisioning),
            Arc::new(keys::test_key_source().unwrap()),
            Arc::new(store.clone()),
        )
    }

    fn token(sub: &str, email: &str) -> String {
        keys::mint_provider_token(PROJECT, sub, email, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_known_email_resolves_existing_identity() {
        let store = InMemoryIdentityStore::new();
        let existing = store.seed(NewIdentity::new("admin@x.com", "Admin", Role::Admin));

        let resolved = verifier(&store, true)
            .verify(&token("firebase-uid-1", "admin@x.com"))
            .await
            .unwrap();

        assert_eq!(resolved.user_id, existing.id);
        assert_eq!(resolved.role, Role::Admin);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_subject_is_provisioned_as_customer() {
        let store = InMemoryIdentityStore::new();

        let resolved = verifier(&store, true)
            .verify(&token("firebase-uid-2", "new@x.com"))
            .await
            .unwrap();

        assert_eq!(resolved.role, Role::Customer);
        let stored = store.find_by_email("new@x.com").await.unwrap().unwrap();
        assert_eq!(stored.external_subject.as_deref(), Some("firebase-uid-2"));
    }

    #[tokio::test]
    async fn test_unknown_subject_without_provisioning() {
        let store = InMemoryIdentityStore::new();

        let result = verifier(&store, false)
            .verify(&token("firebase-uid-3", "nobody@x.com"))
            .await;

        assert_eq!(result, Err(VerificationFailure::UnknownSubject));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_unverified_email_cannot_claim_existing_identity() {
        let store = InMemoryIdentityStore::new();
        store.seed(NewIdentity::new("admin@example.com", "System Admin", Role::Admin));
        let raw = keys::mint_provider_token_with(
            PROJECT,
            "attacker-uid",
            "admin@example.com",
            false,
            Utc::now(),
        )
        .unwrap();

        let result = verifier(&store, true).verify(&raw).await;

        assert_eq!(
            result,
            Err(VerificationFailure::InvalidClaims("email not verified".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unverified_email_is_not_provisioned() {
        let store = InMemoryIdentityStore::new();
        let raw =
            keys::mint_provider_token_with(PROJECT, "uid-4", "fresh@x.com", false, Utc::now())
                .unwrap();

        let result = verifier(&store, true).verify(&raw).await;

        assert!(matches!(result, Err(VerificationFailure::InvalidClaims(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_audience_creates_nothing() {
        let store = InMemoryIdentityStore::new();
        let raw = keys::mint_provider_token("other-project", "uid", "a@x.com", Utc::now()).unwrap();

        let result = verifier(&store, true).verify(&raw).await;

        assert!(matches!(result, Err(VerificationFailure::InvalidClaims(_))));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_expired_token() {
        let store = InMemoryIdentityStore::new();
        let raw = keys::mint_provider_token(
            PROJECT,
            "uid",
            "a@x.com",
            Utc::now() - chrono::Duration::hours(3),
        )
        .unwrap();

        let result = verifier(&store, true).verify(&raw).await;

        assert_eq!(result, Err(VerificationFailure::Expired));
    }

    #[tokio::test]
    async fn test_hmac_token_is_not_this_format() {
        let store = InMemoryIdentityStore::new();
        let mut header = Header::new(jsonwebtoken::Algorithm::HS256);
        header.kid = Some(keys::TEST_KID.to_string());
        let raw = jsonwebtoken::encode(
            &header,
            &serde_json::json!({"sub": "1", "exp": 4_102_444_800_i64}),
            &EncodingKey::from_secret(b"s"),
        )
        .unwrap();

        let result = verifier(&store, true).verify(&raw).await;

        assert_eq!(result, Err(VerificationFailure::Malformed));
    }

    #[tokio::test]
    async fn test_unknown_kid_is_signature_failure() {
        let store = InMemoryIdentityStore::new();
        let verifier = IdentityProviderVerifier::new(
            IdentityProviderConfig::new(PROJECT),
            Arc::new(StaticKeySource::new().with_key("other", DecodingKey::from_secret(b"x"))),
            Arc::new(store.clone()),
        );

        let result = verifier.verify(&token("uid", "a@x.com")).await;

        assert_eq!(result, Err(VerificationFailure::InvalidSignature));
        assert_eq!(store.find_by_id(UserId(1)).await.unwrap(), None);
    }
}
