//! Shared application state for Axum handlers.
//!
//! This module provides thread-safe, clonable state that is shared across
//! all request handlers. It includes:
//!
//! - **Configuration**: read once at startup, immutable afterwards
//! - **Readiness**: one-shot flag flipped by the warmup task
//! - **Counters**: process-wide request counters exposed on `/metrics`
//!
//! # Thread Safety
//!
//! The readiness flag and counters are lock-free atomics. The flag is written
//! with `Release` and read with `Acquire`, so once a reader observes `true`
//! every later read on any thread observes it too.

use std::sync::{Arc, LazyLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::info;

use crate::config::Config;
use crate::metrics;

static PROCESS_START: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Pin the uptime baseline. `main` calls this first thing; otherwise the
/// baseline is taken on first use.
pub fn mark_process_start() {
    LazyLock::force(&PROCESS_START);
}

/// Instant the process started, as pinned by [`mark_process_start`].
pub fn process_start() -> Instant {
    *PROCESS_START
}

/// One-shot readiness flag.
///
/// Starts `false`, becomes `true` once, never reverts.
#[derive(Debug, Clone, Default)]
pub struct Readiness {
    ready: Arc<AtomicBool>,
}

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Mark the service ready.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn mark_ready(&self) -> bool {
        !self.ready.swap(true, Ordering::AcqRel)
    }

    /// Spawn the warmup timer that flips the flag after `delay`.
    ///
    /// The task is detached: it is not cancelled on shutdown and simply dies
    /// with the runtime if the process stops first.
    pub fn spawn_warmup(&self, delay: Duration) {
        let readiness = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if readiness.mark_ready() {
                info!(
                    warmup_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Service is ready"
                );
            }
        });
    }
}

/// Process-wide request counters.
#[derive(Debug, Default)]
pub struct Counters {
    sum_requests: AtomicU64,
}

impl Counters {
    /// Record one successful `/sum` request.
    pub fn record_sum(&self) {
        self.sum_requests.fetch_add(1, Ordering::Relaxed);
        metrics::record_sum_request();
    }

    pub fn sum_requests(&self) -> u64 {
        self.sum_requests.load(Ordering::Relaxed)
    }
}

/// Shared application state for Axum handlers.
///
/// This struct is cloned for each request handler. All internal data
/// is wrapped in `Arc` for efficient sharing.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Process start, the baseline for uptime
    pub started_at: Instant,
    /// Readiness flag consulted by `/readyz`
    pub readiness: Readiness,
    /// Request counters exposed by `/metrics`
    pub counters: Arc<Counters>,
}

impl AppState {
    /// Create new application state and start the warmup timer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: Config) -> Self {
        let state = Self::without_warmup(config);
        state.readiness.spawn_warmup(state.config.warmup_delay);
        state
    }

    /// Create state whose readiness flag is only flipped by an explicit
    /// [`Readiness::mark_ready`] call.
    pub fn without_warmup(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            started_at: process_start(),
            readiness: Readiness::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Seconds since the process started.
    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
