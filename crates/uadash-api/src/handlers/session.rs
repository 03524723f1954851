// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session status and manual connect/disconnect.

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};

use uadash_opcua::SessionStatus;

use crate::error::{ApiError, ApiResult};
use crate::handlers::dashboard::replace_endpoint;
use crate::response::MessageResponse;
use crate::state::AppState;

/// Optional body of a connect request.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectRequest {
    /// Endpoint to switch to before connecting.
    #[serde(default, alias = "opcua_endpoint")]
    pub url: Option<String>,
}

/// Result of a connect request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectResponse {
    /// Confirmation text.
    pub message: String,
    /// Session snapshot after connecting.
    pub status: SessionStatus,
}

/// GET /api/status
pub async fn status(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(state.session.status().await)
}

/// POST /api/connect
///
/// Establishes the session. A body `{ "url": ... }` first switches the
/// configured endpoint. An empty body connects to the current endpoint.
pub async fn connect(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<ConnectResponse>> {
    let request: ConnectRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ConnectRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?
    };

    if let Some(url) = request.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
        if replace_endpoint(&state, url).await? {
            state.session.invalidate().await;
        }
    }

    state.session.ensure_connected().await?;

    let status = state.session.status().await;
    let endpoint = status.bound_endpoint.clone().unwrap_or_default();

    Ok(Json(ConnectResponse {
        message: format!("Successfully connected to {}.", endpoint),
        status,
    }))
}

/// POST /api/disconnect
pub async fn disconnect(State(state): State<AppState>) -> MessageResponse {
    state.session.invalidate().await;
    MessageResponse::new("Disconnected from OPC UA server.")
}
