use std::time::Instant;

use axum::extract::{Path, RawQuery, State};

use crate::api::{CorrelationResponse, JsonResponse};
use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::handlers::{bounded, log_query, query_params};
use crate::query::{translate, Endpoint};

const ENDPOINT: &str = "request_id";

/// GET /payloads/:request_id - Every status reported for one request id, with stage durations
pub async fn get(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    RawQuery(raw): RawQuery,
) -> ApiResult<JsonResponse> {
    state.metrics.inc_requests(ENDPOINT);

    let query = translate(&query_params(raw), Endpoint::ByRequestId, &state.limits)?;
    log_query(&state, ENDPOINT, &query);

    let db_started = Instant::now();
    let records = bounded(
        state.query_timeout,
        state.store.fetch_by_request_id(&request_id, &query),
    )
    .await;
    state.metrics.observe_db_time(ENDPOINT, db_started.elapsed());
    let records = records?;

    if records.is_empty() {
        return Err(ApiError::not_found(format!(
            "payload with id: {} not found",
            request_id
        )));
    }

    let durations = state.store.compute_durations(&records);
    JsonResponse::ok(&CorrelationResponse {
        data: records,
        durations,
    })
}
