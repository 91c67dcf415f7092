//! Error handling for the reconciliation API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gnd_core::error::{ErrorCode, GndError};
use serde::Serialize;
use std::fmt;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    // Common error constructors
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "INDEX_ERROR", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

// Convert from gnd-core errors
impl From<GndError> for ApiError {
    fn from(err: GndError) -> Self {
        let code = err.code();
        let status = match &err {
            GndError::Validation { .. } => StatusCode::BAD_REQUEST,
            GndError::NotFound { .. } => StatusCode::NOT_FOUND,
            GndError::Index { .. } => StatusCode::BAD_GATEWAY,
            GndError::Network { .. } if code == ErrorCode::NetTimeout => {
                StatusCode::GATEWAY_TIMEOUT
            }
            GndError::Network { .. } => StatusCode::BAD_GATEWAY,
            GndError::Ontology { .. }
            | GndError::Context { .. }
            | GndError::Conversion { .. }
            | GndError::Configuration(_)
            | GndError::Parse { .. }
            | GndError::Io(_)
            | GndError::Serialization(_)
            | GndError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(code = code.as_str(), error = %err, "Request failed");
        }

        let mut api_error = ApiError::new(status, code.as_str(), err.to_string());
        if let Some(suggestion) = err.suggestion() {
            api_error = api_error.with_details(serde_json::json!({ "suggestion": suggestion }));
        }
        api_error
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
