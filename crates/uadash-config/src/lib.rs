// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uadash-config
//!
//! Configuration management for the uadash OPC UA dashboard backend.
//!
//! Two kinds of configuration live here:
//!
//! - **Settings**: process settings (listen address, file locations, session
//!   policy, logging) read once at startup from YAML, TOML or JSON with
//!   `UADASH_*` environment overrides.
//! - **Dashboard document**: the operator-edited `config.json` holding the
//!   OPC UA endpoint, tag widgets, groups and layouts. It changes at runtime
//!   and is persisted atomically by [`FileConfigStore`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use uadash_config::{load_config, FileConfigStore};
//!
//! let settings = load_config("uadash.yaml").unwrap();
//! let store = FileConfigStore::open(&settings.storage.dashboard_path).unwrap();
//!
//! match store.load().unwrap().endpoint() {
//!     Some(endpoint) => println!("endpoint: {}", endpoint),
//!     None => println!("no endpoint configured"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod endpoint;
pub mod error;
pub mod loader;
pub mod schema;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use endpoint::{EndpointConfig, EndpointSource, StaticEndpoint};
pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, to_toml_string, ConfigFormat, ConfigLoader};
pub use schema::{
    CorsConfig, HistoryConfig, LogFormat, LogLevel, LoggingConfig, ServerConfig, SessionConfig,
    Settings, StorageConfig,
};
pub use store::{DashboardConfig, FileConfigStore, GroupRecord, NodeFields, NodeRecord};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
