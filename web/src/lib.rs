//! # Wild Trails Web
//!
//! Axum HTTP surface of the Wild Trails backend.
//!
//! # Request Flow
//!
//! 1. **Correlation ID** assigned, `http_request` span opened
//! 2. **Authentication gateway** resolves the bearer token, if any
//! 3. **Policy table** allows or rejects the path for that principal
//! 4. **Handler** runs with the principal in request extensions
//!
//! # Example
//!
//! ```ignore
//! use wildtrails_web::{AppState, Backends, build_router, cors_layer};
//!
//! let state = AppState::new(backends, session_config, provider_verifier);
//! let app = build_router(state, cors_layer(&config.server.cors_allowed_origins));
//! axum::serve(listener, app).await?;
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod registration;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use config::{Config, ConfigError};
pub use error::AppError;
pub use extractors::{CorrelationId, CurrentPrincipal};
pub use middleware::{CORRELATION_ID_HEADER, authenticate, correlation_id_layer};
pub use router::{build_router, cors_layer};
pub use state::{AppState, Backends};
