//! Request middleware.
//!
//! - **Correlation ID**: every request gets an id (from `X-Correlation-ID` or
//!   freshly generated) and an `http_request` span; the id is echoed back.
//! - **Authentication + authorization**: the gateway resolves the bearer
//!   token to an optional principal, the policy table decides, and the
//!   principal is stored in request extensions for handlers.
//!
//! # Example
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/api/admin/getAllBooking", get(list_bookings))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), authenticate))
//!     .layer(correlation_id_layer())
//!     .with_state(state);
//! ```

use crate::error::AppError;
use crate::extractors::CorrelationId;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;
use wildtrails_auth::AuthorizationFailure;

/// Header name for correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Create a layer that adds correlation ID tracking to all requests.
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// Layer for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Middleware service for correlation ID tracking.
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let id = req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        req.extensions_mut().insert(CorrelationId(id));

        let span = tracing::info_span!(
            "http_request",
            correlation_id = %id,
            method = %req.method(),
            uri = %req.uri(),
        );

        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.instrument(span).await?;

            if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
                response.headers_mut().insert(CORRELATION_ID_HEADER, value);
            }

            Ok(response)
        })
    }
}

/// Authenticate the request and enforce the path policy.
///
/// Token problems never fail the request by themselves; they only leave it
/// anonymous. The policy then rejects with 403 `AUTHENTICATION_REQUIRED` or
/// `ACCESS_DENIED` where the path demands more.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let principal = state
        .gateway
        .authenticate_header(header.as_deref())
        .await
        .into_principal();

    let path = req.uri().path();
    if let Err(failure) = state.policy.decide(path, principal.as_ref()) {
        match &failure {
            AuthorizationFailure::Unauthenticated => {
                tracing::info!(path, "Rejected anonymous request");
            }
            AuthorizationFailure::Forbidden { required } => {
                tracing::info!(
                    path,
                    role = ?principal.as_ref().map(|p| p.role),
                    ?required,
                    "Rejected request for role"
                );
            }
        }
        return AppError::from(failure).into_response();
    }

    if let Some(principal) = principal {
        req.extensions_mut().insert(principal);
    }

    next.run(req).await
}
