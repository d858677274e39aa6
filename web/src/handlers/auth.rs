//! Authentication endpoints.
//!
//! - `POST /api/auth/login`: email + password, returns a session token
//! - `GET|POST /api/auth/lookup`: whether an account exists, and its role
//! - `POST /api/auth/firebase/login`: provider token, returns the profile
//! - `GET /api/auth/me`: the current principal

use crate::error::AppError;
use crate::extractors::CurrentPrincipal;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wildtrails_auth::{
    AuthError, CredentialVerifier, Identity, ResolvedIdentity, Role, UserId, VerificationSource,
    bearer_token,
};

/// Login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plain password.
    pub password: String,
}

/// Login response: the token plus the profile it was issued for.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Session token (`Authorization: Bearer <token>`).
    pub token: String,
    /// When the token stops verifying.
    pub expires_at: DateTime<Utc>,
    /// Account id.
    pub id: UserId,
    /// Account email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: Role,
}

/// Public account profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    /// Account id.
    pub id: UserId,
    /// Account email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: Role,
    /// Verifier that accepted the credential, for `/me`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<VerificationSource>,
}

impl From<ResolvedIdentity> for Profile {
    fn from(resolved: ResolvedIdentity) -> Self {
        Self {
            id: resolved.user_id,
            email: resolved.email,
            name: resolved.name,
            role: resolved.role,
            source: None,
        }
    }
}

/// Exchange email + password for a session token.
///
/// # Errors
///
/// 401 `INVALID_CREDENTIALS` for an unknown email, an account without a
/// password, or a wrong password. The three are indistinguishable.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let identity = state
        .identities
        .find_by_email(request.email.trim())
        .await?
        .filter(|identity| password_matches(&state, identity, &request.password))
        .ok_or(AuthError::InvalidCredentials)?;

    let issued = state.sessions.issue(&identity, state.clock.now())?;
    tracing::info!(user_id = %identity.id, role = %identity.role, "Session issued");

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        id: identity.id,
        email: identity.email,
        name: identity.name,
        role: identity.role,
    }))
}

fn password_matches(state: &AppState, identity: &Identity, password: &str) -> bool {
    identity
        .password_hash
        .as_deref()
        .is_some_and(|hash| state.hasher.verify(password, hash))
}

/// Lookup request, as query string or JSON body.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupRequest {
    /// Email to look up.
    pub email: String,
}

/// Lookup result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupResponse {
    /// Whether an account exists.
    pub exists: bool,
    /// Its role, when it exists.
    pub role: Option<Role>,
}

/// `GET /api/auth/lookup?email=`.
///
/// # Errors
///
/// Returns error if the identity store fails.
pub async fn lookup_query(
    State(state): State<AppState>,
    Query(request): Query<LookupRequest>,
) -> Result<(StatusCode, Json<LookupResponse>), AppError> {
    lookup(&state, &request.email).await
}

/// `POST /api/auth/lookup` with `{"email": ...}`.
///
/// # Errors
///
/// Returns error if the identity store fails.
pub async fn lookup_body(
    State(state): State<AppState>,
    Json(request): Json<LookupRequest>,
) -> Result<(StatusCode, Json<LookupResponse>), AppError> {
    lookup(&state, &request.email).await
}

/// 200 with the role when the account exists, 404 otherwise.
async fn lookup(
    state: &AppState,
    email: &str,
) -> Result<(StatusCode, Json<LookupResponse>), AppError> {
    let found = state.identities.find_by_email(email.trim()).await?;
    let status = if found.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    Ok((
        status,
        Json(LookupResponse {
            exists: found.is_some(),
            role: found.map(|identity| identity.role),
        }),
    ))
}

/// Provider sign-in request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLoginRequest {
    /// Provider ID token. Falls back to the `Authorization` header.
    #[serde(default, alias = "token")]
    pub id_token: Option<String>,
}

/// Verify a provider ID token, provisioning the local identity on first
/// sign-in, and return the profile.
///
/// # Errors
///
/// - 404 `NOT_FOUND` when provider sign-in is not configured
/// - 400 `BAD_REQUEST` when no token is supplied
/// - 401 `INVALID_TOKEN` when the token does not verify
pub async fn provider_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<ProviderLoginRequest>>,
) -> Result<Json<Profile>, AppError> {
    let verifier = state
        .identity_provider
        .as_ref()
        .ok_or_else(|| AppError::not_found("Identity provider sign-in is not configured"))?;

    let from_body = body.and_then(|Json(request)| request.id_token);
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string);
    let token = from_body
        .or(from_header)
        .ok_or_else(|| AppError::bad_request("Missing ID token"))?;

    match verifier.verify(&token).await {
        Ok(resolved) => Ok(Json(Profile::from(resolved))),
        Err(failure) => {
            tracing::info!(%failure, "Provider sign-in rejected");
            Err(AppError::invalid_token("Invalid identity token"))
        }
    }
}

/// The current principal.
#[allow(clippy::unused_async)]
pub async fn me(principal: CurrentPrincipal) -> Json<Profile> {
    let principal = principal.0;
    Json(Profile {
        id: principal.user_id,
        email: principal.email,
        name: principal.name,
        role: principal.role,
        source: Some(principal.source),
    })
}
