use axum::http::HeaderMap;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header carrying the caller's forwarded identity claim
pub const IDENTITY_HEADER: &str = "x-rh-identity";

/// Role required to request archive download links
pub const ARCHIVE_DOWNLOAD_ROLE: &str = "platform-archive-download";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Missing x-rh-identity header")]
    Missing,

    #[error("Identity header is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Identity header is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XRhIdentity {
    pub identity: Identity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "type", default)]
    pub identity_type: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub associate: Option<Associate>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Associate {
    #[serde(rename = "Role", default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub username: Option<String>,
}

impl XRhIdentity {
    /// Decodes the raw header value (base64 encoded JSON)
    pub fn decode(raw: &str) -> Result<Self, IdentityError> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(raw.trim())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Self, IdentityError> {
        let raw = raw_identity(headers).ok_or(IdentityError::Missing)?;
        Self::decode(raw)
    }

    /// Only associate identities carry roles
    pub fn has_role(&self, role: &str) -> bool {
        if self.identity.identity_type.as_deref() != Some("Associate") {
            return false;
        }
        self.identity
            .associate
            .as_ref()
            .map_or(false, |a| a.roles.iter().any(|r| r == role))
    }

    /// Short description of who is calling, for logs
    pub fn principal(&self) -> String {
        let id = &self.identity;
        if let Some(email) = id.associate.as_ref().and_then(|a| a.email.as_deref()) {
            return email.to_string();
        }
        if let Some(username) = id.user.as_ref().and_then(|u| u.username.as_deref()) {
            return username.to_string();
        }
        match id.org_id.as_deref().or(id.account_number.as_deref()) {
            Some(org) => format!("org {}", org),
            None => "unknown".to_string(),
        }
    }
}

/// Raw header value, if present and printable
pub fn raw_identity(headers: &HeaderMap) -> Option<&str> {
    headers.get(IDENTITY_HEADER).and_then(|v| v.to_str().ok())
}

/// Decides whether a request's forwarded identity holds a role
pub trait AuthorizationGate: Send + Sync {
    fn has_role(&self, headers: &HeaderMap, role: &str) -> bool;
}

/// Gate that trusts the already-verified `x-rh-identity` header
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityHeaderGate;

impl AuthorizationGate for IdentityHeaderGate {
    fn has_role(&self, headers: &HeaderMap, role: &str) -> bool {
        match XRhIdentity::from_headers(headers) {
            Ok(identity) => identity.has_role(role),
            Err(e) => {
                tracing::debug!("Identity check failed: {}", e);
                false
            }
        }
    }
}
