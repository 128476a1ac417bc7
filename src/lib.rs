//! # Sum Service
//!
//! A small HTTP service with health, readiness and metrics endpoints plus a
//! single arithmetic endpoint, featuring:
//!
//! - **Security**: optional API key check on `/sum`, failing closed
//! - **Observability**: one structured log line per request, request IDs,
//!   JSON counters on `/metrics`, optional Prometheus exporter
//! - **Lifecycle**: warmup-gated readiness, header read timeout, bounded
//!   graceful drain on SIGINT/SIGTERM
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │        Accept loop (hyper-util, header timeout, drain)      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (Request ID → Logging/Recorder → [Auth])        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (healthz, readyz, metrics, sum)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  AppState (Config, Readiness flag, Counters)                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sum_service::{Config, server};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sum_service::AppError> {
//!     let config = Config::from_env()?;
//!     let shutdown = CancellationToken::new();
//!     sum_service::utils::spawn_signal_listener(shutdown.clone());
//!     server::run(config, shutdown).await
//! }
//! ```
//!
//! ## Security Configuration
//!
//! ```bash
//! REQUIRE_API_KEY=true API_KEY=your-secret-key cargo run
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use error::{AppError, AppResult};
pub use routes::build_router;
pub use state::AppState;
