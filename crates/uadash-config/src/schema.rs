// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application settings schema.
//!
//! ```text
//! Settings
//! ├── server: ServerConfig
//! │   └── cors: CorsConfig
//! ├── storage: StorageConfig
//! ├── session: SessionConfig
//! ├── history: HistoryConfig
//! └── logging: LoggingConfig
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.
//! The mutable dashboard document lives elsewhere (see [`crate::store`]).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default dashboard document path.
pub const DEFAULT_DASHBOARD_PATH: &str = "config.json";

/// Default history log path.
pub const DEFAULT_HISTORY_PATH: &str = "history.jsonl";

// =============================================================================
// Settings
// =============================================================================

/// Root application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// File locations.
    pub storage: StorageConfig,

    /// OPC UA session settings.
    pub session: SessionConfig,

    /// Historical data settings.
    pub history: HistoryConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Settings {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.storage.validate()?;
        self.session.validate()?;
        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_address: IpAddr,

    /// Listen port.
    pub port: u16,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// CORS configuration.
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Validates the server configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigError::validation("server.port", "cannot be zero"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout_secs",
                "cannot be zero",
            ));
        }
        Ok(())
    }

    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: DEFAULT_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cors: CorsConfig::default(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Whether CORS headers are emitted.
    pub enabled: bool,

    /// Allowed origins (use "*" for all).
    pub allowed_origins: Vec<String>,

    /// Max age in seconds.
    pub max_age_secs: u64,
}

impl CorsConfig {
    /// Returns `true` if every origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: Vec::new(),
            max_age_secs: 3600,
        }
    }
}

// =============================================================================
// Storage Configuration
// =============================================================================

/// File locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Dashboard document (endpoint, tags, groups, layouts).
    pub dashboard_path: PathBuf,

    /// Append-only JSON-lines history log.
    pub history_path: PathBuf,
}

impl StorageConfig {
    /// Validates the storage configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.dashboard_path.as_os_str().is_empty() {
            return Err(ConfigError::validation(
                "storage.dashboard_path",
                "cannot be empty",
            ));
        }
        if self.history_path.as_os_str().is_empty() {
            return Err(ConfigError::validation(
                "storage.history_path",
                "cannot be empty",
            ));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dashboard_path: PathBuf::from(DEFAULT_DASHBOARD_PATH),
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
        }
    }
}

// =============================================================================
// Session Configuration
// =============================================================================

/// OPC UA session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Tear the session down when a written value cannot be coerced.
    pub invalidate_on_conversion_error: bool,

    /// Application name announced to the server.
    pub application_name: String,

    /// Requested session timeout in milliseconds.
    pub session_timeout_ms: u64,

    /// Accept untrusted server certificates.
    pub trust_server_certs: bool,
}

impl SessionConfig {
    /// Validates the session configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.application_name.trim().is_empty() {
            return Err(ConfigError::validation(
                "session.application_name",
                "cannot be empty",
            ));
        }
        if self.session_timeout_ms == 0 {
            return Err(ConfigError::validation(
                "session.session_timeout_ms",
                "cannot be zero",
            ));
        }
        Ok(())
    }

    /// Returns the session timeout as a Duration.
    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(self.session_timeout_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            invalidate_on_conversion_error: true,
            application_name: "uadash".to_string(),
            session_timeout_ms: 60_000,
            trust_server_certs: true,
        }
    }
}

// =============================================================================
// History Configuration
// =============================================================================

/// Historical data settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Append a sample for every successful read.
    pub record_reads: bool,
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level.
    pub level: LogLevel,

    /// Log format.
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Text,
    /// JSON lines.
    Json,
    /// Single-line compact output.
    Compact,
}

// =============================================================================
// Tests
// =============================================================================
