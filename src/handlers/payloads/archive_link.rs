use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};

use crate::api::JsonResponse;
use crate::app::AppState;
use crate::auth::{raw_identity, XRhIdentity, ARCHIVE_DOWNLOAD_ROLE};
use crate::error::{ApiError, ApiResult};

/// GET /payloads/:request_id/archiveLink - Signed download URL from the storage broker
pub async fn get(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<JsonResponse> {
    state.metrics.inc_requests("archive_link");

    if !state.gate.has_role(&headers, ARCHIVE_DOWNLOAD_ROLE) {
        tracing::warn!("Archive link for {} denied: missing role", request_id);
        return Err(ApiError::unauthorized());
    }

    let identity = raw_identity(&headers);
    let response = state.broker.fetch_archive_link(&request_id, identity).await?;

    let principal = match XRhIdentity::from_headers(&headers) {
        Ok(decoded) => decoded.principal(),
        Err(_) => identity.unwrap_or("unknown").to_string(),
    };
    tracing::info!(
        "Payload archive link for {} generated by {}: {}",
        request_id,
        principal,
        response.raw_body
    );

    Ok(JsonResponse::raw(StatusCode::OK, response.json))
}
