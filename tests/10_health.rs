mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;

use common::FakeStore;

#[tokio::test]
async fn health_reports_ok_when_store_answers() -> Result<()> {
    let router = common::router(Arc::new(FakeStore::default()));

    let (status, body) = common::get(&router, "/health").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn health_reports_unavailable_when_store_fails() -> Result<()> {
    let router = common::router(Arc::new(FakeStore::failing()));

    let (status, body) = common::get(&router, "/health").await?;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert!(body.get("error").is_none());
    Ok(())
}

#[tokio::test]
async fn root_lists_endpoints() -> Result<()> {
    let router = common::router(Arc::new(FakeStore::default()));

    let (status, body) = common::get(&router, "/").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Payload Tracker API");
    assert!(body["endpoints"]["payloads"].is_string());
    Ok(())
}

#[tokio::test]
async fn metrics_are_exposed_as_prometheus_text() -> Result<()> {
    let router = common::router(Arc::new(FakeStore::with_payloads(2)));

    common::get(&router, "/payloads").await?;
    let (status, text) = common::get_text(&router, "/metrics").await?;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("payload_tracker_api_requests_total{endpoint=\"payloads\"} 1"), "{}", text);
    assert!(text.contains("payload_tracker_api_db_seconds_count{endpoint=\"payloads\"} 1"), "{}", text);
    Ok(())
}
