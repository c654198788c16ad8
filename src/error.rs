// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::broker::BrokerError;
use crate::query::QueryError;
use crate::storage::DatabaseError;

/// Body written for every failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub status: u16,
}

/// HTTP API error with appropriate status codes and client-safe messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    MalformedParameter(String),
    ValidationError(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),
    SerializationError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::MalformedParameter(_) => 400,
            ApiError::ValidationError(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::SerializationError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::MalformedParameter(msg) => msg,
            ApiError::ValidationError(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::SerializationError(msg) => msg,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            message: self.message().to_string(),
            status: self.status_code(),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn malformed_parameter(message: impl Into<String>) -> Self {
        ApiError::MalformedParameter(message.into())
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        ApiError::ValidationError(message.into())
    }

    /// Never says which role was missing
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Unauthorized".to_string())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn serialization_error() -> Self {
        ApiError::SerializationError("Internal Server Issue".to_string())
    }
}

// Convert other error types to ApiError
impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        tracing::warn!("Rejected query parameters: {}", err);
        if err.is_malformed() {
            ApiError::malformed_parameter(err.to_string())
        } else {
            ApiError::validation_error(err.to_string())
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Timeout(after) => {
                tracing::error!("Database query timed out after {:?}", after);
                ApiError::internal_server_error("Internal Server Issue")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Internal Server Issue")
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("Internal Server Issue")
            }
        }
    }
}

impl From<BrokerError> for ApiError {
    fn from(err: BrokerError) -> Self {
        tracing::error!("Archive link lookup failed: {}", err);
        ApiError::internal_server_error(err.client_message())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {}", err);
        ApiError::serialization_error()
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_body())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
