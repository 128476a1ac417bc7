//! Health, readiness, and metrics endpoints.
//!
//! # Endpoints
//!
//! - `GET /healthz` - Liveness with process uptime
//! - `GET /readyz` - Readiness gate, 503 until the warmup delay has elapsed
//! - `GET /metrics` - JSON snapshot of process counters and build info
//!
//! # Health vs Readiness
//!
//! - **Health** (`/healthz`): Always 200 while the process can answer
//! - **Readiness** (`/readyz`): 503 while warming up, 200 afterwards, never reverts

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, AppResult};
use crate::models::{BuildInfo, HealthResponse, MetricsSnapshot};
use crate::state::AppState;

/// Liveness endpoint.
///
/// # Response Body
///
/// ```json
/// {"status":"ok","uptime_seconds":12.3}
/// ```
#[instrument(skip(state))]
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Readiness endpoint for Kubernetes probes.
///
/// Returns `200 ready` once the warmup task has flipped the readiness flag,
/// `503 not ready` before that.
#[instrument(skip(state))]
pub async fn readyz(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    if state.readiness.is_ready() {
        Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "ready"))
    } else {
        Err(AppError::NotReady)
    }
}

/// Counters and build information.
///
/// # Response Body
///
/// ```json
/// {
///   "build_info": {"name": "sum_service", "version": "0.1.0"},
///   "sum_requests_total": 42,
///   "uptime_seconds": 3600.0
/// }
/// ```
#[instrument(skip(state))]
pub async fn metrics_snapshot(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(MetricsSnapshot {
        build_info: BuildInfo::current(),
        sum_requests_total: state.counters.sum_requests(),
        uptime_seconds: state.uptime_seconds(),
    })
}
