// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Widget group handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use uadash_config::GroupRecord;
use uadash_opcua::client::coercion::{display_string, is_truthy};

use crate::error::{ApiError, ApiResult};
use crate::extractors::JsonBody;
use crate::response::MessageResponse;
use crate::state::AppState;

/// Body of a group create/update.
#[derive(Debug, Deserialize)]
pub struct GroupRequest {
    /// Existing group id; absent or empty to create.
    #[serde(default)]
    pub id: Option<String>,
    /// Group title.
    #[serde(default)]
    pub title: Value,
    /// Group size.
    #[serde(default)]
    pub size: Value,
}

/// GET /api/groups
pub async fn list_groups(State(state): State<AppState>) -> ApiResult<Json<Vec<GroupRecord>>> {
    let doc = state.with_store(|store| store.load()).await?;
    Ok(Json(doc.groups))
}

/// POST /api/groups
///
/// Creates a group (201) when no `id` is given, otherwise updates it (200).
pub async fn save_group(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<GroupRequest>,
) -> ApiResult<Response> {
    if !is_truthy(&body.title) || !is_truthy(&body.size) {
        return Err(ApiError::bad_request("Group title and size are required."));
    }

    let title = display_string(&body.title);
    let size = body.size;

    match body.id.filter(|id| !id.is_empty()) {
        Some(id) => {
            let updated = state
                .with_store(move |store| store.update(|doc| doc.update_group(&id, title, size)))
                .await?
                .ok_or_else(|| ApiError::not_found("Group"))?;
            Ok(Json(updated).into_response())
        }
        None => {
            let created = state
                .with_store(move |store| store.update(|doc| Some(doc.add_group(title, size))))
                .await?
                .ok_or_else(|| ApiError::internal("group was not created"))?;
            tracing::info!(id = %created.id, "Group created");
            Ok((StatusCode::CREATED, Json(created)).into_response())
        }
    }
}

/// DELETE /api/groups/{id}
///
/// Member nodes are detached, not deleted.
pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    state
        .with_store(move |store| store.update(|doc| doc.remove_group(&id).then_some(())))
        .await?
        .ok_or_else(|| ApiError::not_found("Group"))?;
    Ok(MessageResponse::new("Group deleted successfully."))
}
