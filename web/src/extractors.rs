//! Custom Axum extractors.
//!
//! - `CorrelationId`: the id assigned by the correlation-id layer
//! - `CurrentPrincipal`: the principal the auth middleware attached

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::ops::Deref;
use uuid::Uuid;
use wildtrails_auth::AuthenticatedPrincipal;

/// Correlation ID for request tracing.
///
/// Taken from request extensions when the correlation-id layer ran,
/// otherwise from the `X-Correlation-ID` header, otherwise generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }

        let id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(id))
    }
}

/// The authenticated caller.
///
/// Rejects with 403 `AUTHENTICATION_REQUIRED` when the request is anonymous,
/// which only happens on paths the policy leaves public.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub AuthenticatedPrincipal);

impl Deref for CurrentPrincipal {
    type Target = AuthenticatedPrincipal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedPrincipal>()
            .cloned()
            .map(Self)
            .ok_or_else(AppError::authentication_required)
    }
}
