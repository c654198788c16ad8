// Public endpoints (/, /health, /metrics) and the payload status API
pub mod payloads;
pub mod public;

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use crate::app::AppState;
use crate::query::QueryDescriptor;
use crate::storage::DatabaseError;

/// Query-string pairs, last value wins for repeated keys
pub(crate) fn query_params(raw: Option<String>) -> HashMap<String, String> {
    match raw {
        Some(raw) => url::form_urlencoded::parse(raw.as_bytes()).into_owned().collect(),
        None => HashMap::new(),
    }
}

pub(crate) fn log_query(state: &AppState, endpoint: &str, query: &QueryDescriptor) {
    if state.log_queries {
        tracing::info!(endpoint, ?query, "Translated query");
    } else {
        tracing::debug!(endpoint, ?query, "Translated query");
    }
}

/// Runs a store call, giving up once `limit` has elapsed
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, DatabaseError>
where
    F: Future<Output = Result<T, DatabaseError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| DatabaseError::Timeout(limit))?
}
