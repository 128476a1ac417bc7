//! HTTP server lifecycle.
//!
//! ```text
//! starting ──► warming-up ──► ready ──► shutting-down ──► stopped
//!   bind        warmup timer    flag set   token cancelled    drained or
//!   routes                                 accept loop ends   grace elapsed
//! ```
//!
//! The accept loop is written against `hyper-util` directly rather than
//! `axum::serve` so that two connection-level limits can be enforced:
//!
//! - **Header read timeout**: connections that do not finish sending their
//!   request headers within `header_read_timeout` are closed, including ones
//!   that never send a byte
//! - **Bounded drain**: after shutdown begins, in-flight connections get
//!   `shutdown_grace_period` to finish before they are abandoned

use axum::extract::ConnectInfo;
use axum::http::Request;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::routes::build_router;
use crate::state::AppState;

/// Bind the configured address and serve until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Bind` if the host does not resolve or the listener
/// cannot be created. Shutdown-triggered closure is not an error.
pub async fn run(config: Config, shutdown: CancellationToken) -> AppResult<()> {
    // Host names and bare IPv6 literals resolve through the (host, port) pair
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| AppError::bind(config.server_addr(), e))?;

    let state = AppState::new(config);
    serve(listener, state, shutdown).await
}

/// Serve `state` on an already bound listener until `shutdown` is cancelled.
///
/// Starts nothing besides the accept loop; the caller decides whether the
/// warmup timer runs (see [`AppState::new`]).
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> AppResult<()> {
    let local_addr = listener.local_addr()?;
    let header_read_timeout = state.config.header_read_timeout;
    let grace_period = state.config.shutdown_grace_period;

    info!(
        addr = %local_addr,
        require_api_key = state.config.require_api_key,
        warmup_ms = u64::try_from(state.config.warmup_delay.as_millis()).unwrap_or(u64::MAX),
        "Starting api"
    );

    let router = build_router(state);

    // HTTP/1 only: protocol sniffing would read the first bytes without the
    // header timer, letting a silent client hold the connection forever
    let mut builder = ConnBuilder::new(TokioExecutor::new()).http1_only();
    builder
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(header_read_timeout);

    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            // Stop accepting as soon as shutdown is requested, even if more
            // connections are queued
            biased;

            () = shutdown.cancelled() => break,

            accepted = listener.accept() => {
                let (stream, remote_addr) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                        continue;
                    }
                };

                // The peer address travels with every request as `ConnectInfo`
                let router = router.clone();
                let service = service_fn(move |mut req: Request<Incoming>| {
                    req.extensions_mut().insert(ConnectInfo(remote_addr));
                    router.clone().oneshot(req)
                });
                let conn = builder.serve_connection(TokioIo::new(stream), service);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        debug!(
                            remote_addr = %remote_addr,
                            error = %e,
                            "Connection closed with error"
                        );
                    }
                });
            }
        }
    }

    // Release the port before draining so new connections are refused
    drop(listener);
    info!(
        grace_period_secs = grace_period.as_secs(),
        "Shutting down, draining in-flight requests"
    );

    tokio::select! {
        () = graceful.shutdown() => info!("All connections drained"),
        () = tokio::time::sleep(grace_period) => {
            warn!("Grace period elapsed, abandoning remaining connections");
        }
    }

    info!("Server stopped");
    Ok(())
}
