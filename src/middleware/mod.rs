//! HTTP middleware for authentication and observability.
//!
//! - **API Key Authentication**: optional `X-Api-Key` check, wraps `/sum` only
//! - **Request ID**: generation and propagation of `X-Request-Id`
//! - **Request Logging**: one structured line per request, emitted after the
//!   response body has been handed to the connection
//! - **Response Recorder**: captures the response status for the log line
//!
//! # Architecture
//!
//! ```text
//! Request → Request ID → Logging → Router ─┬─ /sum → Auth → sum
//!                           │              └─ /healthz, /readyz, /metrics
//!                           └── ResponseRecorder captures status, logs at end of body
//! ```

pub mod auth;
pub mod ip;
pub mod logging;
pub mod recorder;
pub mod request_id;

pub use auth::{API_KEY_HEADER, ApiKeyAuth};
pub use ip::{UNKNOWN_ADDR, peer_addr, remote_addr};
pub use logging::{RequestLogLayer, RequestRecord};
pub use recorder::{RecordingBody, ResponseRecorder};
pub use request_id::{REQUEST_ID_HEADER, RequestIdExt, RequestIdLayer};
