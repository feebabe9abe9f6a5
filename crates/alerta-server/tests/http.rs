//! End-to-end router tests (§6.1) driven via `tower::ServiceExt::oneshot`
//! against the real `Engine`, with external collaborators left
//! unconfigured so every request resolves purely from the heuristic path.

use alerta_core::{Engine, EngineConfig};
use alerta_normalize::FixedResolver;
use alerta_server::{build_router, AppState};
use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Every domain host this file's requests analyze, pinned to a harmless
/// public address so the safety gate's DNS step never needs live network
/// egress.
fn test_resolver() -> Arc<dyn alerta_normalize::Resolver> {
    Arc::new(FixedResolver::new().with("www.wikipedia.org", vec!["198.35.26.96".parse().unwrap()]))
}

async fn test_app(temp_dir: &TempDir) -> axum::Router {
    let config = EngineConfig {
        global: alerta_core::GlobalConfig {
            json_store_dir: temp_dir.path().to_path_buf(),
            ..alerta_core::GlobalConfig::default()
        },
        ..EngineConfig::default()
    };
    let engine = Engine::with_resolver(config, test_resolver()).await.unwrap();
    let state = AppState::new(engine);
    build_router(state, &[])
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 0))))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok_with_no_model_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn analyze_returns_a_verdict_for_a_plain_url() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir).await;

    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(json!({"url": "https://www.wikipedia.org/", "model": "heuristic"}).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["score"].as_i64().unwrap() <= 100);
    assert_eq!(body["model_used"], "heuristic");
}

#[tokio::test]
async fn analyze_rejects_a_blocked_target_with_400() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir).await;

    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(json!({"url": "http://169.254.169.254/latest/meta-data/"}).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn settings_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir).await;

    let request = Request::builder()
        .method("POST")
        .uri("/settings/mode")
        .header("content-type", "application/json")
        .body(Body::from(json!({"mode": "offline"}).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/settings").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["mode"], "offline");
}

#[tokio::test]
async fn report_returns_a_report_id() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir).await;

    let request = Request::builder()
        .method("POST")
        .uri("/report")
        .header("content-type", "application/json")
        .body(Body::from(json!({"url": "https://evil.example/phish", "label": "phishing"}).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "received");
    assert!(body["report_id"].is_string());
}

#[tokio::test]
async fn ingest_rejects_an_out_of_range_label() {
    let temp_dir = TempDir::new().unwrap();
    let app = test_app(&temp_dir).await;

    let request = Request::builder()
        .method("POST")
        .uri("/ingest")
        .header("content-type", "application/json")
        .body(Body::from(json!({"url": "https://example.com/", "label": 2}).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
