mod api;

pub use api::{BuildInfo, HealthResponse, MetricsSnapshot, SumRequest, SumResponse};
