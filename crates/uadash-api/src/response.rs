// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// MessageResponse
// =============================================================================

/// Acknowledgement carrying a human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for MessageResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

// =============================================================================
// Node Value Responses
// =============================================================================

/// Result of reading a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeValueResponse {
    /// OPC UA node identifier.
    pub node_ua_id: String,
    /// Value rendered as a string.
    pub value: String,
}

/// Result of writing a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeWriteResponse {
    /// OPC UA node identifier.
    pub node_ua_id: String,
    /// Confirmation text.
    pub message: String,
    /// Data type the value was written as.
    pub written_as: String,
}

// =============================================================================
// Health Responses
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Readiness check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service is ready.
    pub ready: bool,
    /// Component statuses.
    pub components: Vec<ComponentStatus>,
}

/// Status of a system component.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// Component name.
    pub name: String,
    /// Whether the component is healthy.
    pub healthy: bool,
    /// Optional message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    /// Creates a healthy component entry.
    pub fn healthy(name: impl Into<String>, message: Option<String>) -> Self {
        Self {
            name: name.into(),
            healthy: true,
            message,
        }
    }

    /// Creates an unhealthy component entry.
    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            healthy: false,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_shape() {
        let json = serde_json::to_value(MessageResponse::new("Layout saved successfully.")).unwrap();
        assert_eq!(json, serde_json::json!({"message": "Layout saved successfully."}));
    }

    #[test]
    fn test_component_status() {
        let ok = ComponentStatus::healthy("dashboard_store", None);
        assert!(ok.healthy);
        let bad = ComponentStatus::unhealthy("dashboard_store", "unreadable");
        assert_eq!(bad.message.as_deref(), Some("unreadable"));
    }
}
