// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every handler returns [`ApiResult`]; errors are rendered as
//!
//! ```json
//! { "error": "OPC UA client not connected. Configure endpoint.",
//!   "code": "SERVICE_UNAVAILABLE",
//!   "details": { "error_code": "UA-0801", "reason": "...", "hints": ["..."] } }
//! ```
//!
//! `error` is always a plain string so browser code can show it directly.
//!
//! | Source                               | Status |
//! |--------------------------------------|--------|
//! | OPC UA configuration / connection    | 503    |
//! | OPC UA read / write failure          | 500    |
//! | Value does not fit the node's type   | 422    |
//! | Missing field, malformed time bound  | 400    |
//! | Unknown node or group id             | 404    |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use uadash_config::ConfigError;
use uadash_history::HistoryError;
use uadash_opcua::OpcUaError;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Message shown when no OPC UA session can be established.
pub const NOT_CONNECTED_MESSAGE: &str = "OPC UA client not connected. Configure endpoint.";

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404).
    #[error("{resource} not found.")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Bad request (400).
    #[error("{message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Service unavailable (503).
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },

    /// OPC UA session, operation or conversion error.
    #[error(transparent)]
    OpcUa(#[from] OpcUaError),

    /// Dashboard document or settings error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// History log or query error.
    #[error(transparent)]
    History(#[from] HistoryError),
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a service unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::OpcUa(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::OpcUa(OpcUaError::Conversion(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::OpcUa(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::History(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::History(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
            ApiError::OpcUa(e) if e.is_unavailable() => "SERVICE_UNAVAILABLE",
            ApiError::OpcUa(OpcUaError::Conversion(_)) => "VALUE_FORMAT_ERROR",
            ApiError::OpcUa(_) => "OPERATION_FAILED",
            ApiError::Config(_) => "CONFIG_ERROR",
            ApiError::History(e) if e.is_client_error() => "BAD_REQUEST",
            ApiError::History(_) => "HISTORY_ERROR",
        }
    }

    /// Returns the message shown to the caller.
    ///
    /// Internal details of store and log failures are not exposed.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound { .. } | ApiError::BadRequest { .. } => self.to_string(),
            ApiError::ServiceUnavailable { message } => message.clone(),
            ApiError::Internal { .. } => "Internal server error.".to_string(),
            ApiError::OpcUa(e) if e.is_unavailable() => NOT_CONNECTED_MESSAGE.to_string(),
            ApiError::OpcUa(e) => e.to_string(),
            ApiError::Config(_) => "Failed to access dashboard configuration.".to_string(),
            ApiError::History(e) if e.is_client_error() => e.to_string(),
            ApiError::History(_) => "Failed to read historical data.".to_string(),
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::OpcUa(e) => Some(serde_json::json!({
                "error_code": e.error_code().to_string(),
                "reason": e.to_string(),
                "retryable": e.is_retryable(),
                "hints": e.recovery_hints(),
            })),
            _ => None,
        }
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorResponseBody {
            error: self.user_message(),
            code: error_code.to_string(),
            details: self.error_details(),
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Human-readable error message.
    pub error: String,
    /// Error code for programmatic handling.
    pub code: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uadash_opcua::error::{ConnectionError, ConversionError};

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ApiError::not_found("Node").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::bad_request("Value to write is missing.").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::internal("crash").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_opcua_error_mapping() {
        let missing = ApiError::from(OpcUaError::endpoint_missing());
        assert_eq!(missing.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(missing.user_message(), NOT_CONNECTED_MESSAGE);

        let refused = ApiError::from(OpcUaError::from(ConnectionError::refused(
            "opc.tcp://plc:4840",
            "connection refused",
        )));
        assert_eq!(refused.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let read = ApiError::from(OpcUaError::read_failed("ns=2;i=1", "BadNodeIdUnknown"));
        assert_eq!(read.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read.user_message(), "Failed to read node ns=2;i=1: BadNodeIdUnknown");

        let conversion = ApiError::from(OpcUaError::from(ConversionError::invalid_value(
            "Int32",
            "not a number",
        )));
        assert_eq!(conversion.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(conversion.error_code(), "VALUE_FORMAT_ERROR");
    }

    #[test]
    fn test_history_error_mapping() {
        let bound = ApiError::from(HistoryError::invalid_bound("start_time", "soon"));
        assert_eq!(bound.status_code(), StatusCode::BAD_REQUEST);

        let io = ApiError::from(HistoryError::io(
            "/var/lib/uadash/history.jsonl",
            std::io::Error::other("disk on fire"),
        ));
        assert_eq!(io.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!io.user_message().contains("disk on fire"));
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ApiError::not_found("Node").user_message(), "Node not found.");
    }
}
