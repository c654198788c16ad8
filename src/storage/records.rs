use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::query::Verbosity;

/// One tracked payload, as listed by `GET /payloads`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PayloadRecord {
    pub id: i64,
    pub request_id: String,
    pub account: Option<String>,
    pub org_id: Option<String>,
    pub inventory_id: Option<String>,
    pub system_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One lifecycle status reported for a request id.
///
/// Storage always loads every column; `with_verbosity` blanks out what the
/// caller did not ask for, and blank fields are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PayloadStatusRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_msg: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
}

impl PayloadStatusRecord {
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        if verbosity < Verbosity::Standard {
            self.id = None;
            self.request_id = None;
            self.created_at = None;
            self.inventory_id = None;
            self.system_id = None;
        }
        if verbosity < Verbosity::Full {
            self.account = None;
            self.org_id = None;
        }
        self
    }

    /// `service`, or `service:source` when the status names a source
    pub fn stage(&self) -> String {
        match self.source.as_deref() {
            Some(source) if !source.is_empty() => format!("{}:{}", self.service, source),
            _ => self.service.clone(),
        }
    }
}
