// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Test harness: a fully wired router backed by a temp directory.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use uadash_api::{ApiServer, AppState};
use uadash_config::{DashboardConfig, FileConfigStore, Settings};
use uadash_history::{MemoryLog, SampleLog};
use uadash_opcua::SessionManager;

use super::mocks::MockConnector;

/// Upper bound on response bodies read by the harness.
const MAX_BODY: usize = 1 << 20;

/// A wired application with handles to every collaborator.
pub struct TestApp {
    /// Scripted OPC UA server.
    pub connector: Arc<MockConnector>,
    /// The shared session.
    pub session: Arc<SessionManager>,
    /// Dashboard document store.
    pub store: Arc<FileConfigStore>,
    /// Sample log.
    pub history: Arc<MemoryLog>,
    router: Router,
    _dir: tempfile::TempDir,
}

impl TestApp {
    /// Builds an app over an empty dashboard document.
    pub fn new() -> Self {
        Self::with_settings(Settings::default(), None)
    }

    /// Builds an app whose dashboard document points at `endpoint`.
    pub fn connected(endpoint: &str) -> Self {
        Self::with_settings(Settings::default(), Some(endpoint))
    }

    /// Builds an app with explicit settings.
    pub fn with_settings(settings: Settings, endpoint: Option<&str>) -> Self {
        let dir = super::temp_test_dir("uadash-app");
        let store = Arc::new(
            FileConfigStore::open(dir.path().join("config.json")).expect("open dashboard store"),
        );
        if let Some(url) = endpoint {
            store
                .save(&super::fixtures::DashboardFixtures::with_endpoint(url))
                .expect("seed endpoint");
        }

        let connector = Arc::new(MockConnector::new());
        let session = Arc::new(SessionManager::new(connector.clone(), store.clone()));
        let history = Arc::new(MemoryLog::new());

        let state = AppState::builder()
            .settings(settings)
            .session(session.clone())
            .store(store.clone())
            .history(history.clone() as Arc<dyn SampleLog>)
            .build()
            .expect("build app state");
        let router = ApiServer::new(state).router();

        Self {
            connector,
            session,
            store,
            history,
            router,
            _dir: dir,
        }
    }

    /// Current dashboard document.
    pub fn document(&self) -> DashboardConfig {
        self.store.load().expect("load dashboard document")
    }

    /// Sends a GET request.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    /// Sends a POST request with a JSON body.
    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body.to_string())).await
    }

    /// Sends a POST request with a raw body.
    pub async fn post_raw(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body.to_string())).await
    }

    /// Sends a DELETE request.
    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    async fn send(&self, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
