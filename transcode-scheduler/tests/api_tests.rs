//! HTTP tests driving the router directly.

mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use transcode_scheduler::api::{ApiServer, ApiServerConfig, AppState};

use common::{FakeTranscoder, setup};

async fn app() -> (Router, std::sync::Arc<FakeTranscoder>) {
    let (services, transcoder) = setup().await;
    let state = AppState::new(&services, "http://scheduler.test");
    let router = ApiServer::new(ApiServerConfig::default(), state).build_router();
    (router, transcoder)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, body) = send_full(app, method, uri, body).await;
    (status, body)
}

async fn send_full(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, value)
}

async fn create(app: &Router, input: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/jobs",
        Some(json!({"input": input, "output": "out.mp4", "preset": "h264"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_job() {
    let (app, transcoder) = app().await;

    let (status, headers, body) = send_full(
        &app,
        Method::POST,
        "/api/jobs",
        Some(json!({
            "input": "in.mov",
            "output": "out.mp4",
            "preset": "h264",
            "priority": "4",
            "arguments": "a=b,c=d"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();
    assert_eq!(body["state"], "scheduled");
    assert_eq!(body["priority"], 4);
    assert_eq!(body["arguments"], json!({"a": "b", "c": "d"}));
    assert_eq!(
        body["callback_url"],
        format!("http://scheduler.test/api/jobs/{id}")
    );
    assert_eq!(headers["location"], format!("/api/jobs/{id}").as_str());
    assert_eq!(
        headers["x-state-changes-location"],
        format!("/api/jobs/{id}/state_changes").as_str()
    );
    assert_eq!(transcoder.dispatch_count(), 1);
}

#[tokio::test]
async fn test_create_invalid_job() {
    let (app, transcoder) = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/jobs",
        Some(json!({"input": "in.mov", "preset": "vp9"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("output"));
    assert_eq!(transcoder.dispatch_count(), 0);
}

#[tokio::test]
async fn test_dispatch_failure_is_bad_gateway() {
    let (app, transcoder) = app().await;
    transcoder.reject_dispatches(true);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/jobs",
        Some(json!({"source": "in.mov", "destination": "out.mp4", "preset": "h264"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "DISPATCH_FAILED");
}

#[tokio::test]
async fn test_worker_callback() {
    let (app, _) = app().await;
    let id = create(&app, "in.mov").await;
    let uri = format!("/api/jobs/{id}");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"status": "processing", "progress": 0.75, "duration": "30.5"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "processing");
    assert_eq!(body["progress"], 0.75);
    assert_eq!(body["duration"], 30.5);

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({"status": "paused"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, Method::PUT, "/api/jobs/999", Some(json!({"status": "failed"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, &format!("{uri}/state_changes"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_show_job() {
    let (app, _) = app().await;
    let id = create(&app, "in.mov").await;

    let (status, body) = send(&app, Method::GET, &format!("/api/jobs/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["preset"]["name"], "h264");
    assert_eq!(body["host"], Value::Null);
    assert_eq!(body["state_changes"][0]["state"], "scheduled");
}

#[tokio::test]
async fn test_list_and_search() {
    let (app, _) = app().await;
    create(&app, "alpha.mov").await;
    let beta = create(&app, "beta.mov").await;

    let (status, body) = send(&app, Method::GET, "/api/jobs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["items"][0]["id"], beta);

    let (_, body) = send(&app, Method::GET, "/api/jobs?q=source%3Aalpha", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["source_file"], "alpha.mov");

    let (_, body) = send(&app, Method::GET, "/api/jobs/scheduled", None).await;
    assert_eq!(body["total"], 2);
    let (_, body) = send(&app, Method::GET, "/api/jobs/on_hold", None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_delete_and_purge() {
    let (app, transcoder) = app().await;
    let keep = create(&app, "keep.mov").await;
    let failed = create(&app, "failed.mov").await;
    let doomed = create(&app, "doomed.mov").await;

    let (status, _) = send(&app, Method::DELETE, &format!("/api/jobs/{doomed}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(transcoder.cancel_count(), 1);

    send(
        &app,
        Method::PUT,
        &format!("/api/jobs/{failed}"),
        Some(json!({"status": "failed", "message": "codec error"})),
    )
    .await;
    let (status, body) = send(&app, Method::DELETE, "/api/jobs/purge", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);

    let (_, body) = send(&app, Method::GET, "/api/jobs", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], keep);
}

#[tokio::test]
async fn test_retry() {
    let (app, transcoder) = app().await;
    let id = create(&app, "in.mov").await;

    let (status, body) = send(&app, Method::POST, &format!("/api/jobs/{id}/retry"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "scheduled");
    assert_eq!(transcoder.dispatch_count(), 2);
}

#[tokio::test]
async fn test_presets_and_hosts() {
    let (app, _) = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/presets",
        Some(json!({"name": "hevc", "parameters": {"crf": 28}})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let preset_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::POST, "/api/presets", Some(json!({"name": "hevc"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = send(&app, Method::GET, "/api/presets", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/presets/{preset_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/hosts",
        Some(json!({"name": "w1", "url": "http://w1:8080"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let host_id = body["id"].as_str().unwrap().to_string();
    let (status, body) = send(&app, Method::GET, &format!("/api/hosts/{host_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "w1");
}

#[tokio::test]
async fn test_health_and_logging() {
    let (app, _) = app().await;

    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    // No subscriber handle is installed in tests
    let (status, _) = send(&app, Method::GET, "/api/logging", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
