// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Live node reads and writes.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use uadash_opcua::NodeRef;

use crate::error::{ApiError, ApiResult};
use crate::extractors::JsonBody;
use crate::response::{NodeValueResponse, NodeWriteResponse};
use crate::state::AppState;

/// Body of a write request.
#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    /// Value to write; `null` counts as missing.
    #[serde(default)]
    pub value: Option<Value>,

    /// Widget type hint, e.g. `"switch"`.
    #[serde(rename = "type", default)]
    pub type_hint: Option<Value>,
}

/// GET /api/node_value/{*node_ref}
///
/// Reads a node through the shared session and returns its display string.
pub async fn read_node_value(
    State(state): State<AppState>,
    Path(node_ref): Path<String>,
) -> ApiResult<Json<NodeValueResponse>> {
    let node = NodeRef::new(node_ref);
    let value = state.session.read(&node).await?;

    state.record_read(node.as_str(), &value).await;

    Ok(Json(NodeValueResponse {
        node_ua_id: node.into_inner(),
        value,
    }))
}

/// POST /api/node_value/{*node_ref}
///
/// Coerces `value` to the node's live data type and writes it.
pub async fn write_node_value(
    State(state): State<AppState>,
    Path(node_ref): Path<String>,
    JsonBody(body): JsonBody<WriteRequest>,
) -> ApiResult<Json<NodeWriteResponse>> {
    let raw = body
        .value
        .ok_or_else(|| ApiError::bad_request("Value to write is missing."))?;
    let type_hint = body.type_hint.as_ref().and_then(Value::as_str);

    let node = NodeRef::new(node_ref);
    let written = state.session.write(&node, &raw, type_hint).await?;

    tracing::info!(node_id = %node, written_as = %written.data_type(), "Value written");

    Ok(Json(NodeWriteResponse {
        node_ua_id: node.into_inner(),
        message: "Value written successfully.".to_string(),
        written_as: written.data_type().to_string(),
    }))
}
