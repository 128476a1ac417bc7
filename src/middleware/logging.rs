//! Structured request logging middleware.
//!
//! Emits exactly one `tracing` event per request, after the response has been
//! written, with the fields:
//!
//! | Field | Example |
//! |---|---|
//! | `time` | `2024-01-15T10:30:00.123456789Z` |
//! | `remote_addr` | `10.0.0.7:51234` |
//! | `method` | `POST` |
//! | `path` | `/sum` |
//! | `status` | `200` |
//! | `duration_ms` | `3` |
//! | `request_id` | `550e8400-e29b-41d4-a716-446655440000` |
//!
//! With `LOG_FORMAT=json` each event is a single JSON line.

use std::borrow::Cow;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use chrono::{SecondsFormat, Utc};
use tower::{Layer, Service};
use tracing::info;

use super::ip::remote_addr;
use super::recorder::ResponseRecorder;
use super::request_id::RequestIdExt;
use crate::metrics;

/// Routes known to the router; anything else is labelled `unmatched` in metrics.
const KNOWN_PATHS: [&str; 4] = ["/healthz", "/readyz", "/sum", "/metrics"];

/// Facts about one request, filled in as it is served.
#[derive(Debug)]
pub struct RequestRecord {
    started: Instant,
    elapsed: Option<Duration>,
    remote_addr: Cow<'static, str>,
    method: Method,
    path: String,
    request_id: Option<String>,
    status: StatusCode,
}

impl RequestRecord {
    /// Start timing `req`. The status defaults to `200 OK`.
    pub fn start<B>(req: &Request<B>) -> Self {
        Self {
            started: Instant::now(),
            elapsed: None,
            remote_addr: remote_addr(req),
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            request_id: req.request_id(),
            status: StatusCode::OK,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Freeze the request duration. Later calls keep the first measurement.
    pub fn stop_timer(&mut self) {
        if self.elapsed.is_none() {
            self.elapsed = Some(self.started.elapsed());
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.unwrap_or_else(|| self.started.elapsed())
    }

    /// Whole milliseconds, truncated.
    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Write the log line and record the duration histogram.
    pub fn emit(self) {
        let elapsed = self.elapsed();
        info!(
            target: "http",
            time = %Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
            remote_addr = %self.remote_addr,
            method = %self.method,
            path = %self.path,
            status = self.status.as_u16(),
            duration_ms = self.duration_ms(),
            request_id = self.request_id.as_deref().unwrap_or("-"),
            "request"
        );

        let path_label = if KNOWN_PATHS.contains(&self.path.as_str()) {
            self.path.as_str()
        } else {
            "unmatched"
        };
        metrics::record_request_duration(
            self.method.as_str(),
            path_label,
            self.status.as_u16(),
            elapsed.as_secs_f64(),
        );
    }
}

/// Request logging layer for the Tower middleware stack.
#[derive(Clone, Default)]
pub struct RequestLogLayer;

impl RequestLogLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestLogLayer {
    type Service = RequestLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLogService { inner }
    }
}

/// Request logging service wrapper.
#[derive(Clone)]
pub struct RequestLogService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestLogService<S>
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
        let recorder = ResponseRecorder::new(RequestRecord::start(&req));

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match inner.call(req).await {
                Ok(response) => Ok(recorder.record(response)),
                Err(e) => {
                    recorder.abandon();
                    Err(e)
                }
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::io;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::body::to_bytes;
    use axum::extract::ConnectInfo;
    use serde_json::Value;
    use tower::ServiceExt;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;
    use crate::config::Config;
    use crate::routes::build_router;
    use crate::state::AppState;

    #[test]
    fn test_record_captures_request_fields() {
        let addr: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        let mut req = Request::builder()
            .method(Method::POST)
            .uri("/sum?debug=1")
            .header("x-request-id", "req-1")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));

        let record = RequestRecord::start(&req);

        assert_eq!(record.method, Method::POST);
        assert_eq!(record.path, "/sum");
        assert_eq!(record.remote_addr, "127.0.0.1:40000");
        assert_eq!(record.request_id.as_deref(), Some("req-1"));
        assert_eq!(record.status(), StatusCode::OK);
    }

    #[test]
    fn test_stop_timer_freezes_duration() {
        let req = Request::builder().body(Body::empty()).unwrap();
        let mut record = RequestRecord::start(&req);

        record.stop_timer();
        let first = record.elapsed();
        std::thread::sleep(Duration::from_millis(5));
        record.stop_timer();

        assert_eq!(record.elapsed(), first);
    }

    #[test]
    fn test_duration_ms_truncates() {
        let req = Request::builder().body(Body::empty()).unwrap();
        let mut record = RequestRecord::start(&req);
        record.elapsed = Some(Duration::from_micros(2_999));

        assert_eq!(record.duration_ms(), 2);
    }

    /// Collects everything the subscriber writes.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl CapturedLogs {
        /// JSON lines logged under the `http` target.
        fn request_lines(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str::<Value>(line).unwrap())
                .filter(|line| line["target"] == "http")
                .collect()
        }
    }

    #[tokio::test]
    async fn test_one_json_line_per_request() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::INFO)
            .with_writer(logs.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let config = Config {
            require_api_key: true,
            api_key: "secret".to_string(),
            ..Config::default()
        };
        let router = build_router(AppState::without_warmup(config));

        let addr: SocketAddr = "10.1.2.3:5555".parse().unwrap();
        let mut req = Request::builder()
            .method(Method::POST)
            .uri("/sum")
            .body(Body::from(r#"{"a":1,"b":2}"#))
            .unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));

        let response = router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(logs.request_lines().is_empty(), "logged before the body was sent");

        to_bytes(response.into_body(), usize::MAX).await.unwrap();

        let lines = logs.request_lines();
        assert_eq!(lines.len(), 1);
        let fields = &lines[0]["fields"];
        assert_eq!(fields["message"], "request");
        assert_eq!(fields["remote_addr"], "10.1.2.3:5555");
        assert_eq!(fields["method"], "POST");
        assert_eq!(fields["path"], "/sum");
        assert_eq!(fields["status"], 401);
        assert!(fields["duration_ms"].is_u64());
        assert!(fields["request_id"].as_str().is_some_and(|id| !id.is_empty()));
        let time = fields["time"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok(), "bad time {time}");
    }

    #[test]
    fn test_emit_without_subscriber_still_consumes_record() {
        let req = Request::builder().uri("/nope").body(Body::empty()).unwrap();
        let mut record = RequestRecord::start(&req);
        record.set_status(StatusCode::NOT_FOUND);

        assert_eq!(record.status(), StatusCode::NOT_FOUND);
        record.emit();
    }
}
