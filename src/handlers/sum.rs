//! The arithmetic endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{AppError, AppResult};
use crate::models::SumRequest;
use crate::state::AppState;

/// Add two integers.
///
/// Only `POST` is accepted. The body is a JSON object with integer fields
/// `a` and `b` (missing ones count as zero); the response is `{"sum":a+b}`
/// followed by a newline.
/// The counter is incremented only after the body decoded successfully, so a
/// rejected request leaves no trace besides its log line.
#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn sum(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> AppResult<Response> {
    if method != Method::POST {
        return Err(AppError::MethodNotAllowed(method));
    }

    let request = decode_sum_request(&body)?;
    let response = request.sum();
    state.counters.record_sum();
    debug!(a = request.a, b = request.b, sum = response.sum, "Computed sum");

    let mut encoded = serde_json::to_vec(&response)
        .map_err(|e| AppError::Internal(format!("failed to encode response: {e}")))?;
    encoded.push(b'\n');

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        encoded,
    )
        .into_response())
}

/// Decode the request body, mapping every parse failure to `BadRequest`.
///
/// Only the first JSON value is read; anything after it is ignored. That
/// value must be an object or `null` (all operands zero).
pub fn decode_sum_request(body: &[u8]) -> AppResult<SumRequest> {
    let value = serde_json::Deserializer::from_slice(body)
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| AppError::BadRequest("empty body".to_string()))?
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    match value {
        Value::Null => Ok(SumRequest::default()),
        Value::Object(_) => {
            serde_json::from_value(value).map_err(|e| AppError::BadRequest(e.to_string()))
        }
        _ => Err(AppError::BadRequest("expected a JSON object".to_string())),
    }
}
