// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::response::{ComponentStatus, HealthResponse, ReadinessResponse};
use crate::state::AppState;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Simple liveness check. Returns 200 OK if the service is running.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

// =============================================================================
// Readiness Check
// =============================================================================

/// GET /ready
///
/// Ready when the dashboard document can be loaded. The OPC UA session is
/// reported but not required: it is established lazily on the first request.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let mut components = Vec::new();

    let store_ok = match state.with_store(|store| store.load()).await {
        Ok(doc) => {
            components.push(ComponentStatus::healthy(
                "dashboard_store",
                Some(format!("{} nodes, {} groups", doc.nodes.len(), doc.groups.len())),
            ));
            true
        }
        Err(e) => {
            components.push(ComponentStatus::unhealthy("dashboard_store", e.to_string()));
            false
        }
    };

    let status = state.session.status().await;
    components.push(ComponentStatus::healthy(
        "opcua_session",
        Some(match &status.bound_endpoint {
            Some(url) => format!("{} ({})", status.state, url),
            None => status.state.to_string(),
        }),
    ));

    components.push(ComponentStatus::healthy(
        "history_log",
        Some(state.history.name().to_string()),
    ));

    let response = ReadinessResponse {
        ready: store_ok,
        components,
    };

    if store_ok {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
