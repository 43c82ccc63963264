//! Integration tests for the assistant proxy.
//!
//! Each test drives the full axum router with a stub transport, so no
//! network access or real API key is needed.
//! Run with: cargo test --test integration

use std::sync::Arc;

use assistant_proxy::api::{create_router, AppState};
use assistant_proxy::assistant::{AssistantClient, StubTransport};
use assistant_proxy::config::Config;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

fn configured() -> Config {
    Config {
        openai_api_key: Some("sk-test".to_string()),
        openai_assistant_id: Some("asst_123".to_string()),
        ..Config::default()
    }
}

fn app_with(config: Config, stub: &StubTransport) -> Router {
    let client = AssistantClient::new(&config, Arc::new(stub.clone())).unwrap();
    create_router(AppState::new(config, client))
}

fn app(stub: &StubTransport) -> Router {
    app_with(configured(), stub)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Send a request and return status plus parsed JSON body (Null when empty).
async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn add_message_relays_upstream_json() {
    let echoed = json!({ "id": "m1", "role": "user", "content": "hi" });
    let stub = StubTransport::ok(echoed.clone());

    let (status, body) = call(
        app(&stub),
        post("/add-message", json!({ "threadId": "t1", "content": "hi" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, echoed);

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(
        requests[0].url.as_str(),
        "https://api.openai.com/v1/threads/t1/messages"
    );
    assert_eq!(requests[0].body, Some(json!({ "role": "user", "content": "hi" })));
    assert_eq!(requests[0].header("Authorization"), Some("Bearer sk-test"));
}

#[tokio::test]
async fn every_route_succeeds_with_required_fields() {
    let cases = [
        (post("/api/openai-api/create-thread", json!({})), "/v1/threads"),
        (
            post("/api/openai-api/add-message", json!({ "threadId": "t1", "content": "hi" })),
            "/v1/threads/t1/messages",
        ),
        (
            post("/api/openai-api/create-run", json!({ "threadId": "t1" })),
            "/v1/threads/t1/runs",
        ),
        (
            get("/api/openai-api/check-run-status?threadId=t1&runId=r1"),
            "/v1/threads/t1/runs/r1",
        ),
        (
            get("/api/openai-api/get-messages?threadId=t1"),
            "/v1/threads/t1/messages",
        ),
    ];

    for (request, upstream_path) in cases {
        let payload = json!({ "object": "test", "path": upstream_path });
        let stub = StubTransport::ok(payload.clone());

        let (status, body) = call(app(&stub), request).await;

        assert_eq!(status, StatusCode::OK, "route for {}", upstream_path);
        assert_eq!(body, payload);
        assert_eq!(stub.call_count(), 1);
        assert_eq!(stub.requests()[0].url.path(), upstream_path);
    }
}

#[tokio::test]
async fn create_run_uses_configured_assistant() {
    let stub = StubTransport::ok(json!({ "id": "run_1", "status": "queued" }));

    let (status, _) = call(app(&stub), post("/create-run", json!({ "threadId": "t1" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stub.requests()[0].body,
        Some(json!({ "assistant_id": "asst_123" }))
    );
}

#[tokio::test]
async fn get_messages_is_capped() {
    let stub = StubTransport::ok(json!({ "object": "list", "data": [] }));
    let config = Config {
        messages_limit: 25,
        ..configured()
    };

    let (status, _) = call(app_with(config, &stub), get("/get-messages?threadId=t1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stub.requests()[0].url.query(), Some("limit=25"));
}

#[tokio::test]
async fn missing_fields_yield_400() {
    let cases = [
        (post("/add-message", json!({})), "threadId and content are required"),
        (
            post("/add-message", json!({ "threadId": "t1" })),
            "threadId and content are required",
        ),
        (
            post("/add-message", json!({ "content": "hi" })),
            "threadId and content are required",
        ),
        (post("/create-run", json!({})), "threadId is required"),
        (get("/check-run-status"), "threadId and runId are required"),
        (
            get("/check-run-status?threadId=t1"),
            "threadId and runId are required",
        ),
        (
            get("/check-run-status?runId=r1"),
            "threadId and runId are required",
        ),
        (get("/get-messages"), "threadId is required"),
    ];

    for (request, message) in cases {
        let stub = StubTransport::ok(json!({}));

        let (status, body) = call(app(&stub), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": message }));
        assert_eq!(stub.call_count(), 0);
    }
}

#[tokio::test]
async fn malformed_body_reads_as_missing_fields() {
    let stub = StubTransport::ok(json!({}));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/create-run")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = call(app(&stub), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "threadId is required" }));
}

#[tokio::test]
async fn oversized_body_yields_413_in_error_envelope() {
    let stub = StubTransport::ok(json!({}));
    let content = "x".repeat(3 * 1024 * 1024);

    let response = app(&stub)
        .oneshot(post(
            "/add-message",
            json!({ "threadId": "t1", "content": content }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn wrong_method_yields_405() {
    let cases = [
        get("/create-thread"),
        get("/add-message"),
        get("/create-run"),
        post("/check-run-status", json!({ "threadId": "t1", "runId": "r1" })),
        post("/get-messages", json!({ "threadId": "t1" })),
    ];

    for request in cases {
        let stub = StubTransport::ok(json!({}));

        let (status, body) = call(app(&stub), request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({ "error": "Method not allowed" }));
        assert_eq!(stub.call_count(), 0);
    }
}

#[tokio::test]
async fn unknown_path_yields_404() {
    for uri in ["/", "/api/openai-api/delete-thread", "/create-thread/extra"] {
        let stub = StubTransport::ok(json!({}));

        let (status, body) = call(app(&stub), post(uri, json!({}))).await;

        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body, json!({ "error": "Not found" }));
        assert_eq!(stub.call_count(), 0);
    }
}

#[tokio::test]
async fn options_is_an_empty_preflight_with_cors_headers() {
    for uri in ["/create-thread", "/anything/at/all", "/"] {
        let stub = StubTransport::ok(json!({}));
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = app_with(Config::default(), &stub)
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers().clone();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, Authorization"
        );
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, OPTIONS"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
        assert_eq!(stub.call_count(), 0);
    }
}

#[tokio::test]
async fn missing_api_key_yields_500_before_routing() {
    let config = Config {
        openai_api_key: None,
        ..configured()
    };

    for request in [
        post("/create-thread", json!({})),
        get("/get-messages?threadId=t1"),
        get("/unknown"),
        get("/create-thread"),
    ] {
        let stub = StubTransport::ok(json!({}));

        let (status, body) = call(app_with(config.clone(), &stub), request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "OpenAI API key is not configured" }));
        assert_eq!(stub.call_count(), 0);
    }
}

#[tokio::test]
async fn missing_assistant_id_yields_500() {
    let config = Config {
        openai_assistant_id: None,
        ..configured()
    };
    let stub = StubTransport::ok(json!({}));

    let (status, body) = call(app_with(config, &stub), post("/create-thread", json!({}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "OpenAI Assistant ID is not configured" }));
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn upstream_errors_keep_their_status() {
    for status in [
        StatusCode::NOT_FOUND,
        StatusCode::TOO_MANY_REQUESTS,
        StatusCode::INTERNAL_SERVER_ERROR,
    ] {
        let upstream = json!({ "error": { "message": "upstream says no" } });
        let stub = StubTransport::json(status, upstream.clone());

        let (got, body) = call(app(&stub), get("/check-run-status?threadId=t1&runId=r1")).await;

        assert_eq!(got, status);
        assert_eq!(body, json!({ "error": upstream }));
        assert_eq!(stub.call_count(), 1);
    }
}

#[tokio::test]
async fn upstream_text_errors_are_wrapped() {
    let stub = StubTransport::raw(StatusCode::BAD_GATEWAY, "bad gateway");

    let (status, body) = call(app(&stub), post("/create-thread", json!({}))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({ "error": "bad gateway" }));
}

#[tokio::test]
async fn transport_failure_yields_500() {
    let stub = StubTransport::failing("connection refused");

    let (status, body) = call(app(&stub), post("/create-thread", json!({}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "upstream request failed: connection refused" })
    );
    assert_eq!(stub.call_count(), 1);
}
