// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use uadash_config::{CorsConfig, ServerConfig};

use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    fn config(&self) -> &ServerConfig {
        &self.state.settings.server
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let config = self.config();

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.request_timeout(),
            ));

        let router = Router::new()
            // Health endpoints
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            // Live values
            .route(
                "/api/node_value/{*node_ref}",
                get(handlers::read_node_value).post(handlers::write_node_value),
            )
            // History
            .route("/api/historical_data", get(handlers::historical_data))
            // Dashboard document
            .route("/api/config", get(handlers::get_config))
            .route("/api/config/endpoint", post(handlers::save_endpoint))
            .route("/api/opcua_endpoint", post(handlers::save_endpoint))
            .route("/api/layout", post(handlers::save_layout))
            .route(
                "/api/scada_layout",
                get(handlers::get_scada_layout).post(handlers::save_scada_layout),
            )
            // Widgets and groups
            .route("/api/nodes", get(handlers::list_nodes).post(handlers::save_node))
            .route("/api/nodes/{id}", delete(handlers::delete_node))
            .route("/api/groups", get(handlers::list_groups).post(handlers::save_group))
            .route("/api/groups/{id}", delete(handlers::delete_group))
            // Session
            .route("/api/status", get(handlers::status))
            .route("/api/connect", post(handlers::connect))
            .route("/api/opcua_connect", post(handlers::connect))
            .route("/api/disconnect", post(handlers::disconnect))
            .layer(middleware_stack);

        let router = if config.cors.enabled {
            router.layer(create_cors_layer(&config.cors))
        } else {
            router
        };

        router.with_state(self.state.clone())
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.addr();
        let router = self.router();

        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config().socket_addr()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
fn create_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .max_age(Duration::from_secs(cors.max_age_secs))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if cors.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_with_origins() {
        let cors = CorsConfig {
            enabled: true,
            allowed_origins: vec!["http://localhost:3000".into(), "not a header\n".into()],
            max_age_secs: 60,
        };
        let _layer = create_cors_layer(&cors);
    }

    #[test]
    fn test_cors_layer_any_origin() {
        let _layer = create_cors_layer(&CorsConfig::default());
    }
}
