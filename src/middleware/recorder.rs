//! Response status capture for request logging.
//!
//! [`ResponseRecorder`] sits between the logging layer and the outbound
//! response. It stores the status code the inner service produced (200 until
//! told otherwise) and passes the response through untouched, apart from
//! wrapping its body in [`RecordingBody`]. The body wrapper is what emits the
//! log line: once the last frame has been handed to the connection, or when
//! the connection drops the body, so logging never delays the client.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::http::{Response, StatusCode};
use http_body::{Body as HttpBody, Frame, SizeHint};

use super::logging::RequestRecord;

/// Captures the response status and defers log emission to the body.
#[derive(Debug)]
pub struct ResponseRecorder {
    record: RequestRecord,
}

impl ResponseRecorder {
    pub fn new(record: RequestRecord) -> Self {
        Self { record }
    }

    /// Status captured so far; `200 OK` until [`set_status`](Self::set_status) is called.
    pub fn status(&self) -> StatusCode {
        self.record.status()
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.record.set_status(status);
    }

    /// Capture the status of `response` and hand it back with a recording body.
    ///
    /// Request timing stops here, when the inner service has produced its
    /// response; the log line itself is written once the body is done.
    pub fn record(mut self, response: Response<Body>) -> Response<Body> {
        self.set_status(response.status());
        self.record.stop_timer();

        let (parts, body) = response.into_parts();
        let body = RecordingBody {
            inner: body,
            record: Some(self.record),
        };
        Response::from_parts(parts, Body::new(body))
    }

    /// Emit the record without a response (the inner service failed).
    pub fn abandon(mut self) {
        self.record.stop_timer();
        self.record.emit();
    }
}

/// Response body that emits its request record when it is finished.
pub struct RecordingBody {
    inner: Body,
    record: Option<RequestRecord>,
}

impl RecordingBody {
    fn emit(&mut self) {
        if let Some(record) = self.record.take() {
            record.emit();
        }
    }
}

impl HttpBody for RecordingBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        if let Poll::Ready(None) = polled {
            this.emit();
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for RecordingBody {
    fn drop(&mut self) {
        // Empty bodies are never polled, and aborted connections never reach
        // the end of the stream
        self.emit();
    }
}
