//! Application configuration loaded from environment variables.
//!
//! The configuration is read exactly once at startup and then shared
//! immutably through [`AppState`](crate::state::AppState). Nothing else in
//! the crate reads the environment.
//!
//! # Security Configuration
//!
//! - `REQUIRE_API_KEY`: the literal string `true` enables API key checks on `/sum`;
//!   any other value (or absence) disables them
//! - `API_KEY`: the expected secret. When auth is enabled and this is empty, every
//!   authenticated request is rejected
//!
//! # Server Tuning
//!
//! - `WARMUP_DELAY_MS`: delay before `/readyz` reports ready (default: 2000)
//! - `HEADER_READ_TIMEOUT_SECS`: request header read timeout (default: 5)
//! - `SHUTDOWN_GRACE_PERIOD_SECS`: graceful drain bound (default: 10)
//! - `MAX_REQUEST_BODY_SIZE`: body limit for `/sum` in bytes (default: 1 MiB)

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable multi-field lines.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(format!("unknown log format '{other}' (expected json or pretty)")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Pretty => f.write_str("pretty"),
        }
    }
}

/// Application configuration.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.server_addr());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 8080)
    pub port: u16,

    /// Maximum time a client may take to send the request headers (default: 5s)
    pub header_read_timeout: Duration,

    /// How long in-flight requests may run after shutdown begins (default: 10s)
    pub shutdown_grace_period: Duration,

    /// Delay after startup before the readiness flag flips (default: 2s)
    pub warmup_delay: Duration,

    /// Maximum accepted `/sum` body size in bytes (default: 1 MiB)
    pub max_request_body_size: usize,

    // =========================================================================
    // Security Configuration
    // =========================================================================
    /// Whether `/sum` requires the `X-Api-Key` header
    pub require_api_key: bool,

    /// Expected API key. Empty means no key can ever match.
    pub api_key: String,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    /// Log level filter (e.g., "info", "debug", "trace")
    pub log_level: String,

    /// Log line format
    pub log_format: LogFormat,

    /// Port for the Prometheus exporter (default: 0 = disabled)
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if a value cannot be parsed or fails validation.
    pub fn from_env() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// `from_env` is a thin wrapper over this; tests pass a map instead of
    /// touching process-wide environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if a value cannot be parsed or fails validation.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            // Server
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            header_read_timeout: Duration::from_secs(parse_var(
                &lookup,
                "HEADER_READ_TIMEOUT_SECS",
                defaults.header_read_timeout.as_secs(),
            )?),
            shutdown_grace_period: Duration::from_secs(parse_var(
                &lookup,
                "SHUTDOWN_GRACE_PERIOD_SECS",
                defaults.shutdown_grace_period.as_secs(),
            )?),
            warmup_delay: Duration::from_millis(parse_var(&lookup, "WARMUP_DELAY_MS", 2000)?),
            max_request_body_size: parse_var(
                &lookup,
                "MAX_REQUEST_BODY_SIZE",
                defaults.max_request_body_size,
            )?,

            // Security
            require_api_key: lookup("REQUIRE_API_KEY").is_some_and(|v| v == "true"),
            api_key: lookup("API_KEY").unwrap_or_default(),

            // Observability
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: parse_var(&lookup, "LOG_FORMAT", defaults.log_format)?,
            metrics_port: parse_var(&lookup, "METRICS_PORT", defaults.metrics_port)?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    ///
    /// An enabled API key requirement with an empty key is accepted: the
    /// service then rejects every `/sum` call, which is the safe failure mode.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if validation fails.
    fn validate(&self) -> AppResult<()> {
        if self.header_read_timeout.is_zero() {
            return Err(AppError::ConfigError(
                "HEADER_READ_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        if self.max_request_body_size == 0 {
            return Err(AppError::ConfigError(
                "MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Display form of the listen address; IPv6 literals are bracketed.
    pub fn server_addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// True when auth is on but no key can ever match.
    pub fn auth_locked_out(&self) -> bool {
        self.require_api_key && self.api_key.is_empty()
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address.
    ///
    /// Returns `None` if metrics are disabled (port = 0).
    pub fn metrics_addr(&self) -> Option<std::net::SocketAddr> {
        if self.metrics_enabled() {
            Some(std::net::SocketAddr::from(([0, 0, 0, 0], self.metrics_port)))
        } else {
            None
        }
    }
}

/// Parse a variable into the specified type, falling back to `default` when unset.
fn parse_var<T, F>(lookup: &F, name: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| AppError::ConfigError(format!("Invalid {name}: {e}"))),
        None => Ok(default),
    }
}

/// Default configuration for testing and development.
///
/// Production deployments should use `Config::from_env()` instead.
impl Default for Config {
    fn default() -> Self {
        Self {
            // Server
            host: "0.0.0.0".to_string(),
            port: 8080,
            header_read_timeout: Duration::from_secs(5),
            shutdown_grace_period: Duration::from_secs(10),
            warmup_delay: Duration::from_secs(2),
            max_request_body_size: 1024 * 1024, // 1MiB
            // Security
            require_api_key: false,
            api_key: String::new(),
            // Observability
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            metrics_port: 0,
        }
    }
}
