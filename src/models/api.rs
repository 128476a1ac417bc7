use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Request body for `POST /sum`.
///
/// Field names match case-insensitively (`a` or `A`). A missing or `null`
/// operand counts as zero; unknown fields are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SumRequest {
    #[serde(default, alias = "A", deserialize_with = "null_as_zero")]
    pub a: i64,
    #[serde(default, alias = "B", deserialize_with = "null_as_zero")]
    pub b: i64,
}

impl SumRequest {
    /// Add the operands with two's-complement wrapping on overflow.
    pub fn sum(&self) -> SumResponse {
        SumResponse {
            sum: self.a.wrapping_add(self.b),
        }
    }
}

/// Response body for `POST /sum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumResponse {
    pub sum: i64,
}

/// Health check response for `GET /healthz`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process can answer
    pub status: &'static str,
    /// Seconds since process start, serialized with one decimal place
    #[serde(serialize_with = "one_decimal")]
    pub uptime_seconds: f64,
}

/// Build metadata exposed under `build_info` in `/metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Process counters returned by `GET /metrics`.
#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub build_info: BuildInfo,
    pub sum_requests_total: u64,
    #[serde(serialize_with = "one_decimal")]
    pub uptime_seconds: f64,
}

/// Round to one decimal place before serializing.
///
/// The shortest round-trip representation of `n / 10.0` always has exactly
/// one fractional digit, so `3.0` renders as `3.0` and `2.46` as `2.5`.
fn one_decimal<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 10.0).round() / 10.0)
}

fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or_default())
}
