//! API key authentication middleware.
//!
//! # Behaviour
//!
//! - Auth disabled (`REQUIRE_API_KEY` not `true`): every request passes through
//! - Auth enabled: the `X-Api-Key` header must equal `API_KEY` exactly
//!   (case-sensitive). An empty configured key never matches, so the wrapped
//!   route becomes unreachable instead of open
//!
//! The layer wraps individual routes (only `/sum` in this service), so
//! health, readiness and metrics stay reachable for probes.
//!
//! # Usage
//!
//! ```bash
//! REQUIRE_API_KEY=true API_KEY=your-secret-key cargo run
//! curl -H "X-Api-Key: your-secret-key" -d '{"a":2,"b":3}' http://localhost:8080/sum
//! ```

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use subtle::ConstantTimeEq;
use tower::{Layer, Service};
use tracing::{debug, warn};

use super::ip::remote_addr;
use crate::config::Config;
use crate::error::AppError;

/// Header name for API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// API key authentication layer.
#[derive(Clone)]
pub struct ApiKeyAuth {
    /// Whether the check is active at all
    require_key: bool,
    /// Expected API key (empty = nothing matches)
    expected_key: Arc<String>,
}

impl ApiKeyAuth {
    /// Create a new API key auth layer.
    ///
    /// # Arguments
    ///
    /// * `require_key` - Whether requests must carry a valid key
    /// * `api_key` - Expected key; ignored when `require_key` is false
    pub fn new(require_key: bool, api_key: impl Into<String>) -> Self {
        Self {
            require_key,
            expected_key: Arc::new(api_key.into()),
        }
    }

    /// Build the layer from application configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.require_api_key, config.api_key.clone())
    }

    /// Check if authentication is enabled.
    pub fn is_enabled(&self) -> bool {
        self.require_key
    }
}

impl<S> Layer<S> for ApiKeyAuth {
    type Service = ApiKeyAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiKeyAuthService {
            inner,
            require_key: self.require_key,
            expected_key: self.expected_key.clone(),
        }
    }
}

/// API key authentication service wrapper.
#[derive(Clone)]
pub struct ApiKeyAuthService<S> {
    inner: S,
    require_key: bool,
    expected_key: Arc<String>,
}

impl<S> Service<Request<Body>> for ApiKeyAuthService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // Take the readied service and leave a fresh clone in its place
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        if !self.require_key {
            return Box::pin(inner.call(req));
        }

        match check_api_key(&req, &self.expected_key) {
            KeyCheck::Valid => {
                debug!("API key authentication successful");
                Box::pin(inner.call(req))
            }
            rejected => {
                warn!(
                    path = %req.uri().path(),
                    remote_addr = %remote_addr(&req),
                    reason = rejected.reason(),
                    "Rejected unauthenticated request"
                );
                Box::pin(async { Ok(AppError::Unauthorized.into_response()) })
            }
        }
    }
}

/// Outcome of comparing the request header with the expected key.
#[derive(Debug, PartialEq, Eq)]
enum KeyCheck {
    Valid,
    NotConfigured,
    Missing,
    Mismatch,
}

impl KeyCheck {
    fn reason(&self) -> &'static str {
        match self {
            KeyCheck::Valid => "valid",
            KeyCheck::NotConfigured => "no API key configured",
            KeyCheck::Missing => "missing API key",
            KeyCheck::Mismatch => "invalid API key",
        }
    }
}

fn check_api_key<B>(req: &Request<B>, expected: &str) -> KeyCheck {
    if expected.is_empty() {
        return KeyCheck::NotConfigured;
    }

    // A header that is not valid visible ASCII cannot equal the configured key
    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .map(|value| value.to_str().unwrap_or_default());

    match provided {
        None => KeyCheck::Missing,
        Some(key) if constant_time_eq(key, expected) => KeyCheck::Valid,
        Some(_) => KeyCheck::Mismatch,
    }
}

/// Perform constant-time comparison of two strings.
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
