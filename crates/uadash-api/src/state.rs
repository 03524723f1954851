// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use uadash_config::{ConfigResult, FileConfigStore, Settings};
use uadash_history::{HistoricalSample, MemoryLog, SampleLog};
use uadash_opcua::SessionManager;

use crate::error::{ApiError, ApiResult};

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application settings.
    pub settings: Arc<Settings>,
    /// The OPC UA session.
    pub session: Arc<SessionManager>,
    /// Dashboard document store.
    pub store: Arc<FileConfigStore>,
    /// Historical sample log.
    pub history: Arc<dyn SampleLog>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Runs a dashboard store operation on the blocking pool.
    pub async fn with_store<R, F>(&self, f: F) -> ApiResult<R>
    where
        F: FnOnce(&FileConfigStore) -> ConfigResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| ApiError::internal(format!("store task failed: {}", e)))?
            .map_err(ApiError::from)
    }

    /// Appends a sample for a successful read when read recording is on.
    ///
    /// The sample is keyed by the widget id bound to `node_ua_id` when there
    /// is one, so the historical view can query by widget. Failures are
    /// logged and never reach the caller.
    pub async fn record_read(&self, node_ua_id: &str, value: &str) {
        if !self.settings.history.record_reads {
            return;
        }

        let ua_id = node_ua_id.to_string();
        let key = self
            .with_store(move |store| {
                Ok(store
                    .load()?
                    .node_by_ua_id(&ua_id)
                    .map(|n| n.id.clone())
                    .unwrap_or(ua_id))
            })
            .await
            .unwrap_or_else(|_| node_ua_id.to_string());

        if let Err(e) = self.history.append(HistoricalSample::now(key, value)).await {
            tracing::warn!(
                node_id = %node_ua_id,
                log = self.history.name(),
                error = %e,
                "Failed to record read sample"
            );
        }
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    settings: Option<Settings>,
    session: Option<Arc<SessionManager>>,
    store: Option<Arc<FileConfigStore>>,
    history: Option<Arc<dyn SampleLog>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the settings.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Sets the session manager.
    pub fn session(mut self, session: Arc<SessionManager>) -> Self {
        self.session = Some(session);
        self
    }

    /// Sets the dashboard store.
    pub fn store(mut self, store: Arc<FileConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the history log.
    pub fn history(mut self, history: Arc<dyn SampleLog>) -> Self {
        self.history = Some(history);
        self
    }

    /// Builds the AppState.
    ///
    /// The session manager and store are required. Settings default, and the
    /// history log falls back to an in-memory log.
    pub fn build(self) -> ApiResult<AppState> {
        let session = self
            .session
            .ok_or_else(|| ApiError::internal("session manager not configured"))?;
        let store = self
            .store
            .ok_or_else(|| ApiError::internal("dashboard store not configured"))?;
        let history = self
            .history
            .unwrap_or_else(|| Arc::new(MemoryLog::new()));

        Ok(AppState {
            settings: Arc::new(self.settings.unwrap_or_default()),
            session,
            store,
            history,
        })
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<SessionManager> {
    fn from_ref(state: &AppState) -> Self {
        state.session.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<Settings> {
    fn from_ref(state: &AppState) -> Self {
        state.settings.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uadash_opcua::UnavailableConnector;

    fn parts(dir: &tempfile::TempDir) -> (Arc<FileConfigStore>, Arc<SessionManager>) {
        let store = Arc::new(FileConfigStore::open(dir.path().join("config.json")).unwrap());
        let session = Arc::new(SessionManager::new(
            Arc::new(UnavailableConnector),
            store.clone(),
        ));
        (store, session)
    }

    #[test]
    fn test_builder_requires_session() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = parts(&dir);
        assert!(AppState::builder().store(store).build().is_err());
    }

    #[tokio::test]
    async fn test_record_read_keys_by_widget() {
        let dir = tempfile::tempdir().unwrap();
        let (store, session) = parts(&dir);

        let widget = store
            .update(|doc| {
                Some(doc.add_node(uadash_config::NodeFields {
                    name: "Level".into(),
                    node_ua_id: "ns=2;s=Level".into(),
                    widget_type: "gauge".into(),
                    size: serde_json::json!("small"),
                    group_id: None,
                }))
            })
            .unwrap()
            .unwrap();

        let mut settings = Settings::default();
        settings.history.record_reads = true;
        let log = Arc::new(MemoryLog::new());

        let state = AppState::builder()
            .settings(settings)
            .session(session)
            .store(store)
            .history(log.clone())
            .build()
            .unwrap();

        state.record_read("ns=2;s=Level", "42").await;
        state.record_read("ns=2;s=Unbound", "7").await;

        let samples = log.load_all().await.unwrap();
        assert_eq!(samples[0].node_id, widget.id);
        assert_eq!(samples[1].node_id, "ns=2;s=Unbound");
    }

    #[tokio::test]
    async fn test_record_read_disabled_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let (store, session) = parts(&dir);
        let log = Arc::new(MemoryLog::new());

        let state = AppState::builder()
            .session(session)
            .store(store)
            .history(log.clone())
            .build()
            .unwrap();

        state.record_read("ns=2;s=Level", "42").await;
        assert!(log.is_empty());
    }
}
