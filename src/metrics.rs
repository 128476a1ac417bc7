//! Prometheus metrics for application observability.
//!
//! The JSON `/metrics` route on the main listener is always available. This
//! module adds an optional Prometheus exporter on a separate port
//! (`METRICS_PORT`, disabled by default).
//!
//! # Available Metrics
//!
//! ## Counters
//! - `sum_requests_total` - Successful `/sum` requests
//!
//! ## Histograms
//! - `http_request_duration_seconds` - Request duration (labels: method, path, status)
//!
//! Recording functions are no-ops until [`init_metrics`] installs a recorder.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const SUM_REQUESTS_TOTAL: &str = "sum_requests_total";
    pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
}

/// Initialize the Prometheus metrics exporter.
///
/// Installs the global recorder and starts the Prometheus HTTP listener on
/// `metrics_addr`.
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::SUM_REQUESTS_TOTAL,
        "Total number of successful sum requests"
    );
    describe_histogram!(
        names::REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

/// Record a successful sum request.
pub fn record_sum_request() {
    counter!(names::SUM_REQUESTS_TOTAL).increment(1);
}

/// Record HTTP request duration.
pub fn record_request_duration(method: &str, path: &str, status: u16, duration_secs: f64) {
    histogram!(
        names::REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .record(duration_secs);
}
