//! Authentication constants.

/// Authorization header scheme accepted by the gateway.
pub const BEARER_SCHEME: &str = "Bearer";

/// Default `iss` claim stamped into self-issued session tokens.
pub const DEFAULT_SESSION_ISSUER: &str = "wildtrails";

/// Default lifetime of a self-issued session token, in seconds (24 hours).
pub const DEFAULT_SESSION_TTL_SECS: i64 = 86_400;

/// Identity-provider conventions (Firebase Authentication ID tokens).
pub mod identity_provider {
    /// Issuer prefix; the full issuer is `{prefix}{project_id}`.
    pub const ISSUER_PREFIX: &str = "https://securetoken.google.com/";

    /// Public JWK set used to verify ID-token signatures.
    pub const JWKS_URL: &str =
        "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

    /// How long a fetched key set is trusted before it is refetched, in seconds.
    pub const JWKS_CACHE_TTL_SECS: u64 = 3_600;
}
