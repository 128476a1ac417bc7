//! Router-level tests driven through `tower::ServiceExt::oneshot`.
//!
//! No sockets are opened, so these exercise routing, middleware ordering and
//! response formatting in isolation from the accept loop.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use serde_json::Value;
use sum_service::{AppState, Config, build_router};
use tower::ServiceExt;

fn ready_router(config: Config) -> (Router, AppState) {
    let state = AppState::without_warmup(config);
    state.readiness.mark_ready();
    (build_router(state.clone()), state)
}

fn secured(api_key: &str) -> Config {
    Config {
        require_api_key: true,
        api_key: api_key.to_string(),
        ..Config::default()
    }
}

fn sum_request(method: Method, body: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri("/sum")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_sum_ok() {
    let (router, state) = ready_router(Config::default());

    let response = router
        .oneshot(sum_request(Method::POST, r#"{"a":2,"b":3}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "{\"sum\":5}\n");
    assert_eq!(state.counters.sum_requests(), 1);
}

#[tokio::test]
async fn test_sum_ignores_data_after_first_value() {
    let (router, state) = ready_router(Config::default());

    let response = router
        .oneshot(sum_request(Method::POST, r#"{"a":2,"b":3} {"a":1,"b":1}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "{\"sum\":5}\n");
    assert_eq!(state.counters.sum_requests(), 1);
}

#[tokio::test]
async fn test_sum_rejects_non_object_body() {
    let (router, state) = ready_router(Config::default());

    let response = router
        .oneshot(sum_request(Method::POST, "[2,3]", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "bad json\n");
    assert_eq!(state.counters.sum_requests(), 0);
}

#[tokio::test]
async fn test_sum_method_not_allowed_for_every_other_method() {
    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let (router, state) = ready_router(Config::default());

        let response = router
            .oneshot(sum_request(method.clone(), r#"{"a":2,"b":3}"#, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(response.headers()[header::ALLOW], "POST");
        assert_eq!(state.counters.sum_requests(), 0);
    }
}

#[tokio::test]
async fn test_auth_checked_before_method() {
    let (router, _) = ready_router(secured("test-secret-key"));

    let response = router
        .oneshot(sum_request(Method::GET, "", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "API-Key");
}

#[tokio::test]
async fn test_auth_with_valid_key() {
    let (router, state) = ready_router(secured("test-secret-key"));

    let response = router
        .oneshot(sum_request(
            Method::POST,
            r#"{"a":-4,"b":10}"#,
            Some("test-secret-key"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "{\"sum\":6}\n");
    assert_eq!(state.counters.sum_requests(), 1);
}

#[tokio::test]
async fn test_auth_rejection_does_not_count() {
    let (router, state) = ready_router(secured("test-secret-key"));

    let response = router
        .oneshot(sum_request(Method::POST, r#"{"a":1,"b":1}"#, Some("wrong-key")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(state.counters.sum_requests(), 0);
}

#[tokio::test]
async fn test_readyz_before_warmup() {
    let router = build_router(AppState::without_warmup(Config::default()));

    let response = router
        .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_text(response).await, "not ready\n");
}

#[tokio::test]
async fn test_probes_accept_any_method() {
    for method in [Method::GET, Method::POST, Method::HEAD] {
        let (router, _) = ready_router(Config::default());

        let response = router
            .oneshot(
                Request::builder()
                    .method(method.clone())
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{method}");
    }
}

#[tokio::test]
async fn test_metrics_reflects_counter() {
    let (router, state) = ready_router(Config::default());
    state.counters.record_sum();
    state.counters.record_sum();

    let response = router
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["sum_requests_total"], 2);
    assert!(body["uptime_seconds"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_fallback_404_has_request_id() {
    let (router, _) = ready_router(Config::default());

    let response = router
        .oneshot(
            Request::get("/nope")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()["x-request-id"], "abc-123");
    assert_eq!(body_text(response).await, "404 page not found\n");
}

#[tokio::test]
async fn test_body_limit_enforced() {
    let config = Config {
        max_request_body_size: 16,
        ..Config::default()
    };
    let (router, _) = ready_router(config);

    let response = router
        .oneshot(sum_request(
            Method::POST,
            r#"{"a":1111111111,"b":2222222222}"#,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
