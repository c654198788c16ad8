use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};

/// GET / - Service name and the routes it serves
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Payload Tracker API",
        "version": version,
        "endpoints": {
            "payloads": "/payloads, /api/v1/payloads",
            "request_id": "/payloads/:request_id, /api/v1/payloads/:request_id",
            "archive_link": "/payloads/:request_id/archiveLink (requires platform-archive-download)",
            "health": "/health",
            "metrics": "/metrics",
        }
    }))
}

/// GET /health - 200 while storage answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "timestamp": now })),
            )
        }
    }
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let text = state.metrics.gather().map_err(|e| {
        tracing::error!("Failed to encode metrics: {}", e);
        ApiError::internal_server_error("Internal Server Issue")
    })?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], text))
}
