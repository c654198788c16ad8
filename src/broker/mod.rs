use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use crate::auth::IDENTITY_HEADER;
use crate::config::StorageBrokerConfig;

/// Failures while fetching an archive link, one per proxy stage
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("Invalid storage broker URL: {0}")]
    BuildRequest(#[from] url::ParseError),

    #[error("Request to storage broker failed: {0}")]
    Dispatch(#[source] reqwest::Error),

    /// Non-success replies are reported as-is; their body is never decoded
    #[error("Storage broker returned status {0}")]
    Status(StatusCode),

    #[error("Failed to read storage broker response: {0}")]
    ReadBody(#[source] reqwest::Error),

    #[error("Failed to decode storage broker response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode archive link: {0}")]
    Encode(#[source] serde_json::Error),
}

impl BrokerError {
    /// Client-safe message naming the failed stage
    pub fn client_message(&self) -> &'static str {
        match self {
            BrokerError::BuildRequest(_) => "Error with Request ID",
            BrokerError::Dispatch(_) => "Error fetching payload URL from storage-broker",
            BrokerError::Status(_) => "Storage broker returned an error",
            BrokerError::ReadBody(_) => "Error reading response",
            BrokerError::Decode(_) => "Error unmarshaling the response",
            BrokerError::Encode(_) => "Error converting parsed response to json",
        }
    }
}

/// Archive link document returned by the storage broker.
///
/// Kept as a JSON object so every field the broker sends is passed on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveLink(pub Map<String, Value>);

#[derive(Debug, Clone)]
pub struct ArchiveLinkResponse {
    pub link: ArchiveLink,
    /// Body exactly as the broker sent it
    pub raw_body: String,
    /// Re-encoded body for the caller
    pub json: Vec<u8>,
}

/// HTTP client for the storage broker's archive URL endpoint
#[derive(Debug, Clone)]
pub struct StorageBrokerClient {
    client: reqwest::Client,
    base_url: String,
}

impl StorageBrokerClient {
    pub fn new(config: &StorageBrokerConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &config.url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Base URL with `request_id` appended as a query parameter
    pub fn archive_url(&self, request_id: &str) -> Result<Url, BrokerError> {
        let mut url = Url::parse(&self.base_url)?;
        url.query_pairs_mut().append_pair("request_id", request_id);
        Ok(url)
    }

    /// Asks the broker for a signed archive URL, forwarding the caller's identity verbatim.
    ///
    /// Dropping the returned future cancels the outbound request.
    pub async fn fetch_archive_link(
        &self,
        request_id: &str,
        identity: Option<&str>,
    ) -> Result<ArchiveLinkResponse, BrokerError> {
        let url = self.archive_url(request_id)?;

        let mut request = self.client.get(url);
        if let Some(identity) = identity {
            request = request.header(IDENTITY_HEADER, identity);
        }

        let response = request.send().await.map_err(BrokerError::Dispatch)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BrokerError::Status(status));
        }

        let body = response.bytes().await.map_err(BrokerError::ReadBody)?;
        let link: ArchiveLink = serde_json::from_slice(&body).map_err(BrokerError::Decode)?;
        let json = serde_json::to_vec(&link).map_err(BrokerError::Encode)?;

        Ok(ArchiveLinkResponse {
            link,
            raw_body: String::from_utf8_lossy(&body).into_owned(),
            json,
        })
    }
}
