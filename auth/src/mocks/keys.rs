//! Fixed RSA key pair for identity-provider tokens in tests.

use crate::constants::identity_provider::ISSUER_PREFIX;
use crate::providers::StaticKeySource;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header};
use serde_json::json;

/// Key id carried in the header of test provider tokens.
pub const TEST_KID: &str = "wildtrails-test-key";

const PRIVATE_PEM: &str = include_str!("../../testdata/idp_test_key.pem");
const PUBLIC_PEM: &str = include_str!("../../testdata/idp_test_key.pub.pem");

/// Key source holding the test public key under [`TEST_KID`].
///
/// # Errors
///
/// Returns error if the bundled PEM cannot be parsed.
pub fn test_key_source() -> jsonwebtoken::errors::Result<StaticKeySource> {
    Ok(StaticKeySource::new().with_key(TEST_KID, DecodingKey::from_rsa_pem(PUBLIC_PEM.as_bytes())?))
}

/// Signing key matching [`test_key_source`].
///
/// # Errors
///
/// Returns error if the bundled PEM cannot be parsed.
pub fn test_encoding_key() -> jsonwebtoken::errors::Result<EncodingKey> {
    EncodingKey::from_rsa_pem(PRIVATE_PEM.as_bytes())
}

/// Mint an RS256 provider token for `project`, issued at `issued_at`, valid 1h.
///
/// # Errors
///
/// Returns error if signing fails.
pub fn mint_provider_token(
    project: &str,
    sub: &str,
    email: &str,
    issued_at: DateTime<Utc>,
) -> jsonwebtoken::errors::Result<String> {
    mint_provider_token_with(project, sub, email, true, issued_at)
}

/// Like [`mint_provider_token`], with an explicit `email_verified` claim.
///
/// # Errors
///
/// Returns error if signing fails.
pub fn mint_provider_token_with(
    project: &str,
    sub: &str,
    email: &str,
    email_verified: bool,
    issued_at: DateTime<Utc>,
) -> jsonwebtoken::errors::Result<String> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KID.to_string());

    let claims = json!({
        "iss": format!("{ISSUER_PREFIX}{project}"),
        "aud": project,
        "sub": sub,
        "email": email,
        "email_verified": email_verified,
        "iat": issued_at.timestamp(),
        "exp": (issued_at + Duration::hours(1)).timestamp(),
    });

    jsonwebtoken::encode(&header, &claims, &test_encoding_key()?)
}
