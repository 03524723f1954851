// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Server runtime orchestration.
//!
//! Wires the dashboard store, the OPC UA session manager, the sample log and
//! the HTTP API together, then runs until a shutdown signal arrives.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use uadash_api::{ApiServer, AppState};
use uadash_config::{ConfigLoader, FileConfigStore, SessionConfig, Settings};
use uadash_history::{JsonLinesLog, SampleLog};
use uadash_opcua::{ClientSettings, OpcUaConnector, SessionManager, SessionPolicy};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// DashboardRuntime
// =============================================================================

/// The main runtime that owns every long-lived component.
pub struct DashboardRuntime {
    settings: Arc<Settings>,
    shutdown: ShutdownCoordinator,
    connect_on_start: bool,
}

impl DashboardRuntime {
    /// Creates a new runtime.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            shutdown: ShutdownCoordinator::new(),
            connect_on_start: false,
        }
    }

    /// Opens the OPC UA session before serving requests.
    pub fn with_connect_on_start(mut self, enabled: bool) -> Self {
        self.connect_on_start = enabled;
        self
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Returns the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs the server until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting uadash v{}", uadash_api::VERSION);

        let components = self.initialize_components()?;

        if self.connect_on_start {
            if let Err(e) = components.session.ensure_connected().await {
                warn!(error = %e, "Initial OPC UA connect failed; will retry on first request");
            }
        }

        let result = self.run_main_loop(&components).await;

        components.session.invalidate().await;
        info!("uadash shutdown complete");

        result
    }

    /// Builds every component in dependency order.
    pub fn initialize_components(&self) -> BinResult<DashboardComponents> {
        info!("Initializing components...");

        let store_path = &self.settings.storage.dashboard_path;
        let store = Arc::new(FileConfigStore::open(store_path).map_err(|e| {
            BinError::init(format!(
                "Failed to open dashboard document {}: {}",
                store_path.display(),
                e
            ))
        })?);

        let session = Arc::new(
            SessionManager::new(create_connector(&self.settings.session), store.clone())
                .with_policy(session_policy(&self.settings.session)),
        );

        let history: Arc<dyn SampleLog> =
            Arc::new(JsonLinesLog::new(&self.settings.storage.history_path));
        info!(
            log = history.name(),
            path = %self.settings.storage.history_path.display(),
            record_reads = self.settings.history.record_reads,
            "History log ready"
        );

        let state = AppState::builder()
            .settings(self.settings.as_ref().clone())
            .session(session.clone())
            .store(store)
            .history(history)
            .build()?;

        Ok(DashboardComponents { session, state })
    }

    async fn run_main_loop(&self, components: &DashboardComponents) -> BinResult<()> {
        let server = ApiServer::new(components.state.clone());
        info!("uadash is ready (API: {})", server.addr());

        let mut server_task = tokio::spawn(server.run_with_shutdown(self.shutdown.shutdown_signal()));

        tokio::select! {
            _ = self.shutdown.wait_for_shutdown() => {
                info!("Shutdown initiated, cleaning up...");
            }
            joined = &mut server_task => {
                self.shutdown.initiate_shutdown();
                return flatten_server_result(joined);
            }
        }

        flatten_server_result(server_task.await)
    }
}

fn flatten_server_result(
    joined: Result<uadash_api::ApiResult<()>, tokio::task::JoinError>,
) -> BinResult<()> {
    match joined {
        Ok(result) => result.map_err(BinError::from),
        Err(e) => Err(BinError::runtime(format!("API server task failed: {}", e))),
    }
}

// =============================================================================
// DashboardComponents
// =============================================================================

/// Long-lived components built by the runtime.
pub struct DashboardComponents {
    /// The shared OPC UA session.
    pub session: Arc<SessionManager>,
    /// HTTP handler state.
    pub state: AppState,
}

// =============================================================================
// Component Factories
// =============================================================================

/// Maps session settings onto the client identity used for connects.
pub fn client_settings(config: &SessionConfig) -> ClientSettings {
    ClientSettings {
        application_name: config.application_name.clone(),
        session_timeout: config.session_timeout(),
        trust_server_certs: config.trust_server_certs,
        ..ClientSettings::default()
    }
}

/// Maps session settings onto the failure-recovery policy.
pub fn session_policy(config: &SessionConfig) -> SessionPolicy {
    SessionPolicy {
        invalidate_on_conversion_error: config.invalidate_on_conversion_error,
    }
}

#[cfg(feature = "real-transport")]
fn create_connector(config: &SessionConfig) -> Arc<dyn OpcUaConnector> {
    info!("Using OPC UA transport");
    Arc::new(uadash_opcua::client::RealOpcUaConnector::new(client_settings(config)))
}

#[cfg(not(feature = "real-transport"))]
fn create_connector(config: &SessionConfig) -> Arc<dyn OpcUaConnector> {
    warn!(
        application_name = %client_settings(config).application_name,
        "Built without `real-transport`; every connect will fail"
    );
    Arc::new(uadash_opcua::UnavailableConnector)
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    settings: Option<Settings>,
    port: Option<u16>,
    connect_on_start: bool,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the settings file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the settings directly.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Overrides the listen port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Opens the OPC UA session at startup.
    pub fn connect_on_start(mut self, enabled: bool) -> Self {
        self.connect_on_start = enabled;
        self
    }

    /// Builds the runtime.
    ///
    /// Without explicit settings the file at `config_path` is loaded, or
    /// defaults when that file does not exist.
    pub fn build(self) -> BinResult<DashboardRuntime> {
        let mut settings = match (self.settings, self.config_path) {
            (Some(settings), _) => settings,
            (None, Some(path)) if path.exists() => ConfigLoader::new().load(&path).map_err(|e| {
                BinError::from(e).with_context(format!("loading settings from {}", path.display()))
            })?,
            (None, _) => ConfigLoader::new().load_defaults()?,
        };

        if let Some(port) = self.port {
            settings.server.port = port;
            settings.validate()?;
        }

        Ok(DashboardRuntime::new(settings).with_connect_on_start(self.connect_on_start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_settings(dir: &tempfile::TempDir) -> Settings {
        let mut settings = Settings::default();
        settings.storage.dashboard_path = dir.path().join("config.json");
        settings.storage.history_path = dir.path().join("history.jsonl");
        settings
    }

    #[test]
    fn test_runtime_builder_port_override() {
        let runtime = RuntimeBuilder::new()
            .settings(Settings::default())
            .port(Some(8088))
            .connect_on_start(true)
            .build()
            .unwrap();

        assert_eq!(runtime.settings().server.port, 8088);
        assert!(runtime.connect_on_start);
    }

    #[test]
    fn test_runtime_builder_rejects_zero_port() {
        let result = RuntimeBuilder::new()
            .settings(Settings::default())
            .port(Some(0))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_runtime_builder_names_unparsable_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uadash.yaml");
        std::fs::write(&path, "server: [unterminated").unwrap();

        let err = RuntimeBuilder::new().config_path(&path).build().err().unwrap();
        assert!(matches!(err, BinError::WithContext { .. }));
        assert!(err.to_string().starts_with("loading settings from"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_session_mappings() {
        let config = SessionConfig {
            invalidate_on_conversion_error: false,
            application_name: "plant-dash".into(),
            session_timeout_ms: 5_000,
            trust_server_certs: false,
        };

        let client = client_settings(&config);
        assert_eq!(client.application_name, "plant-dash");
        assert_eq!(client.session_timeout, std::time::Duration::from_secs(5));
        assert!(!client.trust_server_certs);
        assert!(!session_policy(&config).invalidate_on_conversion_error);
    }

    #[tokio::test]
    async fn test_initialize_components_creates_dashboard_document() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = DashboardRuntime::new(temp_settings(&dir));

        let components = runtime.initialize_components().unwrap();

        assert!(dir.path().join("config.json").exists());
        assert!(components.session.bound_endpoint().is_none());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = temp_settings(&dir);
        settings.server.bind_address = "127.0.0.1".parse().unwrap();
        settings.server.port = 0;

        let runtime = DashboardRuntime::new(settings);
        let shutdown = runtime.shutdown().clone();
        shutdown.initiate_shutdown();

        tokio::time::timeout(std::time::Duration::from_secs(5), runtime.run())
            .await
            .expect("runtime should stop")
            .unwrap();
    }
}
