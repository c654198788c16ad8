use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{AuthorizationGate, IdentityHeaderGate};
use crate::broker::StorageBrokerClient;
use crate::config::AppConfig;
use crate::handlers::{payloads, public};
use crate::metrics::ApiMetrics;
use crate::query::QueryLimits;
use crate::storage::PayloadStore;

/// Shared dependencies handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PayloadStore>,
    pub gate: Arc<dyn AuthorizationGate>,
    pub broker: StorageBrokerClient,
    pub limits: QueryLimits,
    pub query_timeout: Duration,
    pub metrics: ApiMetrics,
    /// Log every translated query at info instead of debug
    pub log_queries: bool,
}

impl AppState {
    pub fn new(
        store: Arc<dyn PayloadStore>,
        broker: StorageBrokerClient,
        config: &AppConfig,
    ) -> Result<Self, prometheus::Error> {
        Ok(Self {
            store,
            gate: Arc::new(IdentityHeaderGate),
            broker,
            limits: QueryLimits::from(&config.query),
            query_timeout: Duration::from_secs(config.database.query_timeout_secs),
            metrics: ApiMetrics::new()?,
            log_queries: config.query.debug_logging,
        })
    }
}

/// Full router: public endpoints plus the payload API at `/` and `/api/v1`
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/metrics", get(public::metrics))
        .merge(payload_routes())
        .nest("/api/v1", payload_routes())
        .with_state(state);

    let router = if config.security.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn payload_routes() -> Router<AppState> {
    Router::new()
        .route("/payloads", get(payloads::list))
        .route("/payloads/:request_id", get(payloads::request_id))
        .route("/payloads/:request_id/archiveLink", get(payloads::archive_link))
}
