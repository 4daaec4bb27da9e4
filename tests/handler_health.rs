mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use serde_json::Value;
use unbang::api::handlers::health_handler;

#[tokio::test]
async fn test_health_reports_healthy_components() {
    let state = common::create_test_state(common::StaticUpstream::ok(common::SAMPLE_DIRECTORY));
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state);
    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["edge_cache"]["status"], "ok");
    assert_eq!(body["checks"]["directory"]["status"], "ok");
}

#[tokio::test]
async fn test_health_reports_directory_age_after_load() {
    let state = common::create_test_state(common::StaticUpstream::ok(common::SAMPLE_DIRECTORY));
    let directory = state.directory.clone();
    directory.snapshot().await;

    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state);
    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    let message = body["checks"]["directory"]["message"]
        .as_str()
        .unwrap_or_default();
    assert!(message.contains("3 entries"));
}
