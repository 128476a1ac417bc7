//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │   Request ID     │ ← Adds X-Request-Id header
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ Request Logging  │ ← One structured line per request
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │     Router       │ ← 404 for unknown paths
//! └────────┬─────────┘
//!          │  /sum only
//!          ▼
//! ┌──────────────────┐
//! │  Authentication  │ ← 401 if required and invalid
//! └────────┬─────────┘
//!          │
//!          ▼
//!      Handler
//! ```
//!
//! # Routes
//!
//! All routes accept any method; `/sum` itself answers 405 to anything but POST.
//!
//! - `/healthz`, `/readyz`, `/metrics` - Health & monitoring (never authenticated)
//! - `/sum` - Integer addition (optionally authenticated)

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::any;
use tower::ServiceBuilder;
use tracing::{info, warn};

use crate::handlers;
use crate::middleware::{ApiKeyAuth, RequestIdLayer, RequestLogLayer};
use crate::state::AppState;

/// Build the application router with all routes and middleware configured.
///
/// The auth layer is always installed on `/sum`; when `require_api_key` is
/// false it passes every request through.
pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    let auth = ApiKeyAuth::from_config(config);
    if auth.is_enabled() {
        if config.auth_locked_out() {
            warn!("API key required but API_KEY is empty; every /sum request will be rejected");
        } else {
            info!("API key authentication enabled for /sum");
        }
    } else {
        info!("API key authentication disabled (REQUIRE_API_KEY is not 'true')");
    }

    // Outermost first: the body limit is set before auth runs
    let sum_route = any(handlers::sum).layer(
        ServiceBuilder::new()
            .layer(DefaultBodyLimit::max(config.max_request_body_size))
            .layer(auth),
    );

    Router::new()
        .route("/healthz", any(handlers::healthz))
        .route("/readyz", any(handlers::readyz))
        .route("/metrics", any(handlers::metrics_snapshot))
        .route("/sum", sum_route)
        .fallback(handlers::not_found)
        // Applied bottom to top: request id runs first, so the log line sees it
        .layer(RequestLogLayer::new())
        .layer(RequestIdLayer::new())
        .with_state(state)
}
