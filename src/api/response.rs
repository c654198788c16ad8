use std::collections::BTreeMap;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::storage::{PayloadRecord, PayloadStatusRecord};

/// Body of `GET /payloads`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadsResponse {
    /// Matches for the filters, ignoring pagination
    pub count: i64,
    /// Seconds spent handling the request
    pub duration: f64,
    pub data: Vec<PayloadRecord>,
}

/// Body of `GET /payloads/:request_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResponse {
    pub data: Vec<PayloadStatusRecord>,
    pub durations: BTreeMap<String, String>,
}

/// Already-serialized JSON body with its status code.
///
/// Serializing up front lets a failure surface as an `ApiError` in the
/// handler instead of inside `into_response`.
#[derive(Debug)]
pub struct JsonResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl JsonResponse {
    /// 200 OK with `data` encoded as JSON
    pub fn ok<T: Serialize>(data: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_vec(data)?;
        Ok(Self {
            status: StatusCode::OK,
            body,
        })
    }

    /// Bytes that are already valid JSON
    pub fn raw(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }
}

impl IntoResponse for JsonResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response()
    }
}
