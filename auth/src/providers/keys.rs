//! Signing-key sources for identity-provider tokens.

use crate::error::VerificationFailure;
use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Resolves a key id (`kid` header) to a verification key.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Look up the key for `kid`.
    ///
    /// # Errors
    ///
    /// - `VerificationFailure::InvalidSignature` if no key carries that id
    /// - `VerificationFailure::Unavailable` if the key set cannot be fetched
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, VerificationFailure>;
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

/// JWK set fetched over HTTPS and cached for a fixed TTL.
///
/// An unknown `kid` forces one refetch before failing, so key rotation on the
/// provider side is picked up without waiting for the TTL.
pub struct RemoteJwks {
    url: String,
    http: reqwest::Client,
    ttl: Duration,
    cache: RwLock<Option<CachedKeys>>,
}

impl RemoteJwks {
    /// Create a key source for the JWK set at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::new(),
            ttl,
            cache: RwLock::new(None),
        }
    }

    async fn cached(&self, kid: &str) -> Option<DecodingKey> {
        let guard = self.cache.read().await;
        guard
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .and_then(|cached| cached.keys.get(kid).cloned())
    }

    async fn refresh(&self) -> Result<(), VerificationFailure> {
        let set: JwkSet = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| VerificationFailure::Unavailable(format!("JWK fetch failed: {e}")))?
            .json()
            .await
            .map_err(|e| VerificationFailure::Unavailable(format!("JWK decode failed: {e}")))?;

        let mut keys = HashMap::new();
        for jwk in &set.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(e) => tracing::warn!(%kid, error = %e, "Skipping unusable JWK"),
            }
        }

        tracing::debug!(url = %self.url, count = keys.len(), "Refreshed JWK set");

        *self.cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl KeySource for RemoteJwks {
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, VerificationFailure> {
        if let Some(key) = self.cached(kid).await {
            return Ok(key);
        }

        self.refresh().await?;

        let guard = self.cache.read().await;
        guard
            .as_ref()
            .and_then(|cached| cached.keys.get(kid).cloned())
            .ok_or(VerificationFailure::InvalidSignature)
    }
}

/// Fixed, in-process key set.
///
/// Used in development and tests, where tokens are minted locally.
#[derive(Clone, Default)]
pub struct StaticKeySource {
    keys: HashMap<String, DecodingKey>,
}

impl StaticKeySource {
    /// Create an empty key source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key under `kid`.
    #[must_use]
    pub fn with_key(mut self, kid: impl Into<String>, key: DecodingKey) -> Self {
        self.keys.insert(kid.into(), key);
        self
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, VerificationFailure> {
        self.keys
            .get(kid)
            .cloned()
            .ok_or(VerificationFailure::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source_resolves_known_kid() {
        let source = StaticKeySource::new().with_key("k1", DecodingKey::from_secret(b"s"));

        assert!(source.decoding_key("k1").await.is_ok());
        assert_eq!(
            source.decoding_key("k2").await.err(),
            Some(VerificationFailure::InvalidSignature)
        );
    }

    #[tokio::test]
    async fn test_remote_source_unreachable_is_unavailable() {
        let source = RemoteJwks::new("http://127.0.0.1:9/keys", Duration::from_secs(60));

        let result = source.decoding_key("any").await;

        assert!(matches!(result, Err(VerificationFailure::Unavailable(_))));
    }
}
