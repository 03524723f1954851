// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Dashboard document handlers: endpoint, full document and layouts.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use uadash_config::DashboardConfig;

use crate::error::{ApiError, ApiResult};
use crate::extractors::JsonBody;
use crate::response::MessageResponse;
use crate::state::AppState;

// =============================================================================
// Document
// =============================================================================

/// GET /api/config
///
/// Returns the whole dashboard document.
pub async fn get_config(State(state): State<AppState>) -> ApiResult<Json<DashboardConfig>> {
    let doc = state.with_store(|store| store.load()).await?;
    Ok(Json(doc))
}

// =============================================================================
// Endpoint
// =============================================================================

/// Body of an endpoint update.
#[derive(Debug, Deserialize)]
pub struct EndpointRequest {
    /// New endpoint URL.
    #[serde(default, alias = "url")]
    pub opcua_endpoint: Option<String>,
}

/// Result of an endpoint update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSaveResponse {
    /// Confirmation text.
    pub message: String,
    /// The endpoint now configured.
    pub opcua_endpoint: String,
    /// Whether a session to the endpoint is up.
    pub connected: bool,
    /// Why the follow-up connect failed, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_error: Option<String>,
}

/// POST /api/config/endpoint
///
/// Saves a new endpoint. A changed endpoint tears the current session down
/// first; a connect attempt follows, and its failure does not fail the save.
pub async fn save_endpoint(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<EndpointRequest>,
) -> ApiResult<Json<EndpointSaveResponse>> {
    let endpoint = body
        .opcua_endpoint
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("OPC UA Endpoint cannot be empty."))?;

    let changed = replace_endpoint(&state, endpoint.clone()).await?;
    if changed {
        state.session.invalidate().await;
    }

    let connection_error = match state.session.ensure_connected().await {
        Ok(()) => None,
        Err(e) => {
            e.log("save_endpoint");
            Some(e.to_string())
        }
    };

    Ok(Json(EndpointSaveResponse {
        message: "OPC UA endpoint saved.".to_string(),
        opcua_endpoint: endpoint,
        connected: connection_error.is_none(),
        connection_error,
    }))
}

/// Stores `endpoint`; returns `true` if it differs from the previous one.
pub(crate) async fn replace_endpoint(state: &AppState, endpoint: String) -> ApiResult<bool> {
    let changed = state
        .with_store(move |store| {
            store.update(|doc| {
                let changed = doc.opcua_endpoint.trim() != endpoint;
                doc.opcua_endpoint = endpoint;
                Some(changed)
            })
        })
        .await?;

    if changed == Some(true) {
        tracing::info!("OPC UA endpoint changed");
    }
    Ok(changed.unwrap_or(false))
}

// =============================================================================
// Layouts
// =============================================================================

/// POST /api/layout
pub async fn save_layout(
    State(state): State<AppState>,
    JsonBody(layout): JsonBody<Value>,
) -> ApiResult<MessageResponse> {
    state
        .with_store(move |store| {
            store.update(|doc| {
                doc.layout = layout;
                Some(())
            })
        })
        .await?;
    Ok(MessageResponse::new("Layout saved successfully."))
}

/// GET /api/scada_layout
pub async fn get_scada_layout(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let doc = state.with_store(|store| store.load()).await?;
    Ok(Json(doc.scada_layout))
}

/// POST /api/scada_layout
pub async fn save_scada_layout(
    State(state): State<AppState>,
    JsonBody(layout): JsonBody<Value>,
) -> ApiResult<MessageResponse> {
    state
        .with_store(move |store| {
            store.update(|doc| {
                doc.scada_layout = layout;
                Some(())
            })
        })
        .await?;
    Ok(MessageResponse::new("SCADA layout saved successfully."))
}
