//! Security-focused integration tests.
//!
//! Forged, confused and tampered credentials must leave a request anonymous,
//! and an anonymous request must never pass a role-gated path:
//!
//! - Algorithm confusion between the two token formats
//! - Role escalation by re-signing claims
//! - Tokens minted for another provider project
//! - Signature tampering

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::json;
use std::sync::Arc;
use wildtrails_auth::constants::DEFAULT_SESSION_ISSUER;
use wildtrails_auth::mocks::{InMemoryIdentityStore, keys};
use wildtrails_auth::{
    AuthenticationGateway, AuthorizationFailure, CredentialVerifier, IdentityProviderConfig,
    IdentityProviderVerifier, NewIdentity, Role, SessionTokenConfig, SessionTokenIssuer,
    SessionTokenVerifier, VerificationFailure, VerificationSource, default_policy,
};

const PROJECT: &str = "wildtrails-test";
const SECRET: &str = "security-test-secret";
const PUBLIC_PEM: &str = include_str!("../testdata/idp_test_key.pub.pem");

fn provider(store: &InMemoryIdentityStore) -> IdentityProviderVerifier {
    IdentityProviderVerifier::new(
        IdentityProviderConfig::new(PROJECT),
        Arc::new(keys::test_key_source().unwrap()),
        Arc::new(store.clone()),
    )
}

fn gateway(store: &InMemoryIdentityStore) -> AuthenticationGateway {
    AuthenticationGateway::standard(
        Arc::new(provider(store)),
        Arc::new(SessionTokenVerifier::new(&SessionTokenConfig::new(SECRET))),
    )
}

fn session_claims(sub: &str, role: &str) -> serde_json::Value {
    let now = Utc::now().timestamp();
    json!({
        "sub": sub,
        "email": "mallory@x.com",
        "name": "Mallory",
        "role": role,
        "iat": now,
        "exp": now + 3600,
        "iss": DEFAULT_SESSION_ISSUER,
    })
}

/// An HS256 token keyed with the provider's public key must not be accepted
/// by either verifier.
#[tokio::test]
async fn test_public_key_as_hmac_secret_is_rejected() {
    let store = InMemoryIdentityStore::new();
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(keys::TEST_KID.to_string());
    let claims = json!({
        "iss": format!("https://securetoken.google.com/{PROJECT}"),
        "aud": PROJECT,
        "sub": "uid-forged",
        "email": "forged@x.com",
        "exp": Utc::now().timestamp() + 3600,
    });
    let forged = jsonwebtoken::encode(
        &header,
        &claims,
        &EncodingKey::from_secret(PUBLIC_PEM.as_bytes()),
    )
    .unwrap();

    let outcome = gateway(&store).authenticate(Some(&forged)).await;

    assert!(outcome.principal().is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_role_escalation_with_foreign_secret_is_rejected() {
    let forged = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &session_claims("1", "ADMIN"),
        &EncodingKey::from_secret(b"guessed-secret"),
    )
    .unwrap();

    let verifier = SessionTokenVerifier::new(&SessionTokenConfig::new(SECRET));
    assert_eq!(
        verifier.verify(&forged).await.unwrap_err(),
        VerificationFailure::InvalidSignature
    );

    let principal = gateway(&InMemoryIdentityStore::new())
        .authenticate(Some(&forged))
        .await
        .into_principal();
    assert_eq!(
        default_policy().decide("/api/admin/getAllBooking", principal.as_ref()),
        Err(AuthorizationFailure::Unauthenticated)
    );
}

#[tokio::test]
async fn test_session_token_with_non_numeric_subject_is_rejected() {
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &session_claims("admin", "ADMIN"),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let failure = SessionTokenVerifier::new(&SessionTokenConfig::new(SECRET))
        .verify(&token)
        .await
        .unwrap_err();

    assert!(matches!(failure, VerificationFailure::InvalidClaims(_)));
}

#[tokio::test]
async fn test_token_for_another_project_is_rejected() {
    let store = InMemoryIdentityStore::new();
    let token = keys::mint_provider_token("someone-else", "uid-1", "a@x.com", Utc::now()).unwrap();

    let failure = provider(&store).verify(&token).await.unwrap_err();

    assert!(matches!(failure, VerificationFailure::InvalidClaims(_)));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_tampered_signature_is_rejected() {
    let store = InMemoryIdentityStore::new();
    let token = keys::mint_provider_token(PROJECT, "uid-1", "a@x.com", Utc::now()).unwrap();
    let (unsigned, signature) = token.rsplit_once('.').unwrap();
    let flipped = if signature.starts_with('A') { 'B' } else { 'A' };
    let tampered = format!("{unsigned}.{flipped}{}", &signature[1..]);

    let outcome = gateway(&store).authenticate(Some(&tampered)).await;

    assert!(outcome.principal().is_none());
    assert!(store.is_empty());
}

/// A session token keeps the role it was issued with; a later role change
/// is only seen after the next login.
#[tokio::test]
async fn test_session_role_is_fixed_at_issuance() {
    let store = InMemoryIdentityStore::new();
    let identity = store.seed(NewIdentity::new("drv@x.com", "Driver", Role::Driver));
    let token = SessionTokenIssuer::new(SessionTokenConfig::new(SECRET))
        .issue(&identity, Utc::now())
        .unwrap()
        .token;

    let principal = gateway(&store)
        .authenticate(Some(&token))
        .await
        .into_principal()
        .unwrap();

    assert_eq!(principal.source, VerificationSource::SessionToken);
    assert_eq!(
        default_policy().decide("/api/admin/getAllBooking", Some(&principal)),
        Err(AuthorizationFailure::Forbidden { required: vec![Role::Admin] })
    );
    assert_eq!(default_policy().decide("/api/driver/trips", Some(&principal)), Ok(()));
}
