// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Tag widget handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use uadash_config::{NodeFields, NodeRecord};
use uadash_opcua::client::coercion::{display_string, is_truthy};

use crate::error::{ApiError, ApiResult};
use crate::extractors::JsonBody;
use crate::response::MessageResponse;
use crate::state::AppState;

/// Body of a node create/update.
#[derive(Debug, Deserialize)]
pub struct NodeRequest {
    /// Existing widget id; absent or empty to create.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Value,
    /// OPC UA node identifier.
    #[serde(default)]
    pub node_ua_id: Value,
    /// Widget type.
    #[serde(rename = "type", default)]
    pub widget_type: Value,
    /// Widget size.
    #[serde(default)]
    pub size: Value,
    /// Owning group.
    #[serde(rename = "groupId", default)]
    pub group_id: Option<String>,
}

impl NodeRequest {
    fn into_parts(self) -> ApiResult<(Option<String>, NodeFields)> {
        let required = [&self.name, &self.node_ua_id, &self.widget_type, &self.size];
        if !required.into_iter().all(is_truthy) {
            return Err(ApiError::bad_request("Missing required fields."));
        }

        let fields = NodeFields {
            name: display_string(&self.name),
            node_ua_id: display_string(&self.node_ua_id),
            widget_type: display_string(&self.widget_type),
            size: self.size,
            group_id: self.group_id.filter(|g| !g.is_empty()),
        };
        Ok((self.id.filter(|id| !id.is_empty()), fields))
    }
}

/// GET /api/nodes
pub async fn list_nodes(State(state): State<AppState>) -> ApiResult<Json<Vec<NodeRecord>>> {
    let doc = state.with_store(|store| store.load()).await?;
    Ok(Json(doc.nodes))
}

/// POST /api/nodes
///
/// Creates a node (201) when no `id` is given, otherwise updates it (200).
pub async fn save_node(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NodeRequest>,
) -> ApiResult<Response> {
    let (id, fields) = body.into_parts()?;

    match id {
        Some(id) => {
            let updated = state
                .with_store(move |store| store.update(|doc| doc.update_node(&id, fields)))
                .await?
                .ok_or_else(|| ApiError::not_found("Node"))?;
            Ok(Json(updated).into_response())
        }
        None => {
            let created = state
                .with_store(move |store| store.update(|doc| Some(doc.add_node(fields))))
                .await?
                .ok_or_else(|| ApiError::internal("node was not created"))?;
            tracing::info!(id = %created.id, node_id = %created.node_ua_id, "Node created");
            Ok((StatusCode::CREATED, Json(created)).into_response())
        }
    }
}

/// DELETE /api/nodes/{id}
///
/// Also drops the node from both layouts.
pub async fn delete_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    state
        .with_store(move |store| store.update(|doc| doc.remove_node(&id).then_some(())))
        .await?
        .ok_or_else(|| ApiError::not_found("Node"))?;
    Ok(MessageResponse::new("Node deleted successfully."))
}
