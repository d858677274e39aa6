//! Router configuration.

use crate::handlers::{admin, auth, health_check};
use crate::middleware::{authenticate, correlation_id_layer};
use crate::state::AppState;
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// CORS policy for browser clients.
///
/// An empty `origins` list allows any origin. Origins that are not valid
/// header values are skipped. Bearer tokens travel in a header, so
/// credentials mode is never enabled.
#[must_use]
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| tracing::warn!(%origin, "Ignoring invalid CORS origin"))
                .ok()
        }))
    };
    let correlation_id = HeaderName::from_static("x-correlation-id");

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, correlation_id.clone()])
        .expose_headers([correlation_id])
}

/// Build the complete Axum router.
///
/// Layers, outermost first: correlation id, HTTP tracing, CORS (preflights
/// are answered here, before authentication), authentication and policy
/// enforcement.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/lookup", get(auth::lookup_query).post(auth::lookup_body))
        .route("/firebase/login", post(auth::provider_login))
        .route("/firebase/verify", post(auth::provider_login))
        .route("/me", get(auth::me));

    let admin_routes = Router::new()
        .route("/register-driver", post(admin::register_driver))
        .route("/getAvailableDrivers", post(admin::available_drivers))
        .route("/getAllUpcomingBooking", post(admin::upcoming_bookings))
        .route("/bookings/:id/assign-driver", put(admin::assign_driver))
        .route("/getAllBooking", get(admin::all_bookings))
        .route("/:booking_id/cancel-booking", put(admin::cancel_booking));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/admin", admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
