// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Historical data handler.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use uadash_history::{parse_bound, query};

use crate::error::{ApiError, ApiResult};
use crate::extractors::QueryParams;
use crate::state::AppState;

/// Query string of `GET /api/historical_data`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Node (widget id or OPC UA node identifier).
    pub node_id: Option<String>,
    /// Inclusive lower bound.
    pub start_time: Option<String>,
    /// Inclusive upper bound.
    pub end_time: Option<String>,
}

/// One point of the historical view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    /// Key the sample was recorded under.
    pub node_id: String,
    /// OPC UA node identifier.
    pub node_ua_id: String,
    /// Widget name, when `node_id` is a widget id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    /// Timestamp as recorded.
    pub timestamp: String,
    /// Value as recorded.
    pub value: String,
}

/// GET /api/historical_data?node_id=&start_time=&end_time=
///
/// Returns the node's samples within the optional inclusive window, oldest
/// first.
pub async fn historical_data(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<HistoryQuery>,
) -> ApiResult<Json<Vec<HistoricalPoint>>> {
    let node_id = params
        .node_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("node_id is required."))?;

    let start = parse_bound("start_time", params.start_time.as_deref())?;
    let end = parse_bound("end_time", params.end_time.as_deref())?;

    let samples = state.history.load_all().await?;
    let hits = query(&samples, &node_id, start, end);

    let lookup = node_id.clone();
    let widget = state
        .with_store(move |store| Ok(store.load()?.node(&lookup).cloned()))
        .await
        .ok()
        .flatten();

    let (node_ua_id, node_name) = match widget {
        Some(w) => (w.node_ua_id, Some(w.name)),
        None => (node_id, None),
    };

    Ok(Json(
        hits.into_iter()
            .map(|s| HistoricalPoint {
                node_id: s.node_id,
                node_ua_id: node_ua_id.clone(),
                node_name: node_name.clone(),
                timestamp: s.timestamp,
                value: s.value,
            })
            .collect(),
    ))
}
