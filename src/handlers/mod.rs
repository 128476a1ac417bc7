mod health;
mod sum;

use axum::http::StatusCode;
use axum::response::Response;

use crate::error::plain_text;

pub use health::{healthz, metrics_snapshot, readyz};
pub use sum::{decode_sum_request, sum};

/// Fallback for unregistered paths.
pub async fn not_found() -> Response {
    plain_text(StatusCode::NOT_FOUND, "404 page not found")
}
