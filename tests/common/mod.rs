#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use payload_tracker_api::{
    app,
    auth::{ARCHIVE_DOWNLOAD_ROLE, IDENTITY_HEADER},
    broker::StorageBrokerClient,
    config::AppConfig,
    query::QueryDescriptor,
    storage::{DatabaseError, PayloadPage, PayloadRecord, PayloadStatusRecord, PayloadStore},
    AppState,
};

/// In-memory store that records the descriptors it was handed
#[derive(Default)]
pub struct FakeStore {
    pub payloads: Vec<PayloadRecord>,
    pub statuses: Vec<PayloadStatusRecord>,
    /// Every call fails with an internal database error
    pub failing: bool,
    /// Every fetch sleeps this long before answering
    pub delay: Option<StdDuration>,
    pub seen: Mutex<Vec<QueryDescriptor>>,
}

impl FakeStore {
    pub fn with_payloads(count: usize) -> Self {
        Self {
            payloads: (0..count).map(payload).collect(),
            ..Self::default()
        }
    }

    pub fn with_statuses(statuses: Vec<PayloadStatusRecord>) -> Self {
        Self {
            statuses,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: StdDuration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::with_payloads(1)
        }
    }

    async fn answer(&self, query: &QueryDescriptor) -> Result<(), DatabaseError> {
        self.seen.lock().unwrap().push(query.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(DatabaseError::QueryError(
                "relation \"payload_statuses\" does not exist".to_string(),
            ));
        }
        Ok(())
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn last_query(&self) -> Option<QueryDescriptor> {
        self.seen.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PayloadStore for FakeStore {
    async fn fetch_page(&self, query: &QueryDescriptor) -> Result<PayloadPage, DatabaseError> {
        self.answer(query).await?;
        let records = self
            .payloads
            .iter()
            .skip(query.offset() as usize)
            .take(query.page_size() as usize)
            .cloned()
            .collect();
        Ok(PayloadPage {
            total: self.payloads.len() as i64,
            records,
        })
    }

    async fn fetch_by_request_id(
        &self,
        request_id: &str,
        query: &QueryDescriptor,
    ) -> Result<Vec<PayloadStatusRecord>, DatabaseError> {
        self.answer(query).await?;
        Ok(self
            .statuses
            .iter()
            .filter(|s| s.request_id.as_deref() == Some(request_id))
            .cloned()
            .map(|s| s.with_verbosity(query.verbosity()))
            .collect())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        if self.failing {
            Err(DatabaseError::QueryError("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn payload(i: usize) -> PayloadRecord {
    let at = base_time() + Duration::minutes(i as i64);
    PayloadRecord {
        id: i as i64 + 1,
        request_id: format!("req-{}", i),
        account: Some("0001".to_string()),
        org_id: Some("42".to_string()),
        inventory_id: None,
        system_id: None,
        created_at: at,
        updated_at: at,
    }
}

pub fn status(request_id: &str, service: &str, source: Option<&str>, status: &str, offset_ms: i64) -> PayloadStatusRecord {
    PayloadStatusRecord {
        id: Some(offset_ms),
        request_id: Some(request_id.to_string()),
        service: service.to_string(),
        source: source.map(str::to_string),
        status: status.to_string(),
        status_msg: None,
        date: base_time() + Duration::milliseconds(offset_ms),
        created_at: Some(base_time()),
        inventory_id: Some("inv-1".to_string()),
        system_id: None,
        account: Some("0001".to_string()),
        org_id: Some("42".to_string()),
    }
}

pub fn router(store: Arc<FakeStore>) -> Router {
    router_with_broker(store, "http://127.0.0.1:9/archive/url")
}

pub fn router_with_broker(store: Arc<FakeStore>, broker_url: &str) -> Router {
    router_from(state(store, broker_url))
}

pub fn state(store: Arc<FakeStore>, broker_url: &str) -> AppState {
    let broker = StorageBrokerClient::with_client(reqwest::Client::new(), broker_url);
    AppState::new(store, broker, &AppConfig::default()).unwrap()
}

/// State with an unroutable broker and the given storage timeout
pub fn state_with_timeout(store: Arc<FakeStore>, query_timeout: StdDuration) -> AppState {
    AppState {
        query_timeout,
        ..state(store, "http://127.0.0.1:9/archive/url")
    }
}

pub fn router_from(state: AppState) -> Router {
    app(state, &AppConfig::default())
}

pub async fn get_text(router: &Router, uri: &str) -> Result<(StatusCode, String)> {
    let response = router.clone().oneshot(Request::get(uri).body(Body::empty())?).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok((status, String::from_utf8(bytes.to_vec())?))
}

pub async fn get(router: &Router, uri: &str) -> Result<(StatusCode, Value)> {
    send(router, Request::get(uri).body(Body::empty())?).await
}

pub async fn get_with_identity(router: &Router, uri: &str, identity: &str) -> Result<(StatusCode, Value)> {
    let request = Request::get(uri)
        .header(IDENTITY_HEADER, identity)
        .body(Body::empty())?;
    send(router, request).await
}

pub async fn send(router: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

pub fn encode_identity(value: Value) -> String {
    base64::engine::general_purpose::STANDARD.encode(value.to_string())
}

/// Associate identity holding the archive download role
pub fn archive_identity() -> String {
    encode_identity(json!({
        "identity": {
            "type": "Associate",
            "associate": { "Role": [ARCHIVE_DOWNLOAD_ROLE], "email": "jdoe@example.com" }
        }
    }))
}
