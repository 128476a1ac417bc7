use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error types with appropriate HTTP status codes.
///
/// # Request Errors
///
/// `BadRequest`, `MethodNotAllowed`, `Unauthorized` and `NotReady` are produced
/// while serving a request. They render as short plain-text bodies and are
/// reported through the normal request log line, never as crashes.
///
/// # Startup Errors
///
/// `ConfigError`, `Bind` and `Io` only occur before or around the accept loop
/// and are turned into process exit codes by `main`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error("Method {0} not allowed")]
    MethodNotAllowed(axum::http::Method),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Service not ready")]
    NotReady,

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Status code and client-facing message for this error.
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad json"),
            AppError::MethodNotAllowed(_) => (StatusCode::METHOD_NOT_ALLOWED, "method not allowed"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::NotReady => (StatusCode::SERVICE_UNAVAILABLE, "not ready"),

            // Internal errors - never expose details to clients
            AppError::Internal(_)
            | AppError::ConfigError(_)
            | AppError::Bind { .. }
            | AppError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
        }
    }

    /// Map startup failures onto BSD sysexits codes.
    pub fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            AppError::ConfigError(_) => exitcode::CONFIG,
            AppError::Bind { .. } => exitcode::UNAVAILABLE,
            AppError::Io(_) => exitcode::IOERR,
            _ => exitcode::SOFTWARE,
        }
    }

    /// Build a bind error for the given address.
    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Bind {
            addr: addr.into(),
            source,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let mut response = plain_text(status, message);
        match self {
            AppError::MethodNotAllowed(_) => {
                response
                    .headers_mut()
                    .insert(header::ALLOW, HeaderValue::from_static("POST"));
            }
            AppError::Unauthorized => {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("API-Key"));
            }
            _ => {}
        }
        response
    }
}

/// Plain-text response with a trailing newline.
pub fn plain_text(status: StatusCode, message: &str) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        format!("{message}\n"),
    )
        .into_response()
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
