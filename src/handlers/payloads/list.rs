use std::time::Instant;

use axum::extract::{RawQuery, State};

use crate::api::{JsonResponse, PayloadsResponse};
use crate::app::AppState;
use crate::error::ApiResult;
use crate::handlers::{bounded, log_query, query_params};
use crate::query::{translate, Endpoint};

const ENDPOINT: &str = "payloads";

/// GET /payloads - Page through tracked payloads
pub async fn get(State(state): State<AppState>, RawQuery(raw): RawQuery) -> ApiResult<JsonResponse> {
    let started = Instant::now();
    state.metrics.inc_requests(ENDPOINT);

    let query = translate(&query_params(raw), Endpoint::AllPayloads, &state.limits)?;
    log_query(&state, ENDPOINT, &query);

    let db_started = Instant::now();
    let page = bounded(state.query_timeout, state.store.fetch_page(&query)).await;
    state.metrics.observe_db_time(ENDPOINT, db_started.elapsed());
    let page = page?;

    JsonResponse::ok(&PayloadsResponse {
        count: page.total,
        duration: started.elapsed().as_secs_f64(),
        data: page.records,
    })
}
