use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sum_service::config::LogFormat;
use sum_service::{Config, metrics, server, state, utils};

#[tokio::main]
async fn main() -> ExitCode {
    state::mark_process_start();
    let config = Config::from_env();

    // Logging must be up before a configuration error can be reported
    let (log_level, log_format) = match &config {
        Ok(config) => (config.log_level.clone(), config.log_format),
        Err(_) => ("info".to_string(), LogFormat::default()),
    };
    init_tracing(&log_level, log_format);

    info!("Starting Sum Service v{}", env!("CARGO_PKG_VERSION"));

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {e}");
            return exit_code(e.exit_code());
        }
    };
    info!(
        host = %config.host,
        port = %config.port,
        require_api_key = config.require_api_key,
        log_format = %config.log_format,
        "Configuration loaded"
    );

    if let Some(metrics_addr) = config.metrics_addr() {
        metrics::try_init_metrics(metrics_addr);
    }

    let shutdown = CancellationToken::new();
    utils::spawn_signal_listener(shutdown.clone());

    match server::run(config, shutdown).await {
        Ok(()) => {
            info!("Server shutdown complete");
            exit_code(exitcode::OK)
        }
        Err(e) => {
            error!("Server error: {e}");
            exit_code(e.exit_code())
        }
    }
}

fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(false)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init(),
    }
}

fn exit_code(code: exitcode::ExitCode) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
