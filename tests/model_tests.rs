//! Unit tests for API models.
#![allow(clippy::unwrap_used, clippy::expect_used)]

// Note: These tests can be run with: cargo test --test model_tests

mod sum_tests {
    use serde_json::json;
    use sum_service::models::{SumRequest, SumResponse};

    #[test]
    fn test_sum_request_deserialization() {
        let request: SumRequest = serde_json::from_value(json!({ "a": 2, "b": 3 })).unwrap();

        assert_eq!(request, SumRequest { a: 2, b: 3 });
        assert_eq!(request.sum(), SumResponse { sum: 5 });
    }

    #[test]
    fn test_sum_request_ignores_unknown_fields() {
        let request: SumRequest =
            serde_json::from_value(json!({ "a": 1, "b": 1, "c": "extra" })).unwrap();

        assert_eq!(request.sum().sum, 2);
    }

    #[test]
    fn test_sum_request_missing_operands_default_to_zero() {
        let request: SumRequest = serde_json::from_value(json!({ "a": 1 })).unwrap();
        assert_eq!(request, SumRequest { a: 1, b: 0 });

        let request: SumRequest = serde_json::from_value(json!({ "b": 1 })).unwrap();
        assert_eq!(request, SumRequest { a: 0, b: 1 });

        let request: SumRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request, SumRequest::default());
    }

    #[test]
    fn test_sum_request_null_operand_is_zero() {
        let request: SumRequest = serde_json::from_value(json!({ "a": null, "b": 5 })).unwrap();
        assert_eq!(request.sum().sum, 5);
    }

    #[test]
    fn test_sum_request_uppercase_field_names() {
        let request: SumRequest = serde_json::from_value(json!({ "A": 4, "B": -1 })).unwrap();
        assert_eq!(request, SumRequest { a: 4, b: -1 });
    }

    #[test]
    fn test_sum_is_commutative_and_signed() {
        let pairs = [(0, 0), (-7, 7), (-3, -4), (1_000_000_007, -1), (i64::MAX, 0)];
        for (a, b) in pairs {
            let forward = SumRequest { a, b }.sum();
            let backward = SumRequest { a: b, b: a }.sum();
            assert_eq!(forward, backward);
            assert_eq!(forward.sum, a + b);
        }
    }

    #[test]
    fn test_sum_wraps_on_overflow() {
        let request = SumRequest { a: i64::MAX, b: 1 };
        assert_eq!(request.sum().sum, i64::MIN);

        let request = SumRequest { a: i64::MIN, b: -1 };
        assert_eq!(request.sum().sum, i64::MAX);
    }

    #[test]
    fn test_sum_response_serialization() {
        let body = serde_json::to_string(&SumResponse { sum: -12 }).unwrap();
        assert_eq!(body, r#"{"sum":-12}"#);
    }
}

mod health_tests {
    use sum_service::models::HealthResponse;

    fn render(uptime_seconds: f64) -> String {
        serde_json::to_string(&HealthResponse {
            status: "ok",
            uptime_seconds,
        })
        .unwrap()
    }

    #[test]
    fn test_health_response_shape() {
        assert_eq!(render(3.0), r#"{"status":"ok","uptime_seconds":3.0}"#);
    }

    #[test]
    fn test_uptime_rounded_to_one_decimal() {
        assert_eq!(render(0.0), r#"{"status":"ok","uptime_seconds":0.0}"#);
        assert_eq!(render(2.46), r#"{"status":"ok","uptime_seconds":2.5}"#);
        assert_eq!(render(12.04), r#"{"status":"ok","uptime_seconds":12.0}"#);
        assert_eq!(render(59.95), r#"{"status":"ok","uptime_seconds":60.0}"#);
    }
}

mod metrics_tests {
    use serde_json::Value;
    use sum_service::models::{BuildInfo, MetricsSnapshot};

    #[test]
    fn test_build_info_matches_package() {
        let info = BuildInfo::current();
        assert_eq!(info.name, "sum_service");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_metrics_snapshot_serialization() {
        let snapshot = MetricsSnapshot {
            build_info: BuildInfo::current(),
            sum_requests_total: 42,
            uptime_seconds: 7.26,
        };

        let value: Value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["sum_requests_total"], 42);
        assert_eq!(value["uptime_seconds"], 7.3);
        assert_eq!(value["build_info"]["name"], "sum_service");
        assert_eq!(value["build_info"]["version"], env!("CARGO_PKG_VERSION"));
    }
}
