// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application settings loading.
//!
//! Settings are read from a YAML, TOML or JSON file and then overridden by
//! environment variables, using the `config` crate for both layers.
//!
//! # Environment Variable Override
//!
//! Variables use the `UADASH_` prefix and `__` between nested keys:
//!
//! ```text
//! UADASH_SERVER__PORT=8080
//! UADASH_STORAGE__DASHBOARD_PATH=/var/lib/uadash/config.json
//! UADASH_HISTORY__RECORD_READS=true
//! UADASH_LOGGING__LEVEL=debug
//! ```

use std::collections::HashMap;
use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::Settings;

/// Default environment variable prefix.
pub const ENV_PREFIX: &str = "UADASH";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Loads [`Settings`] from files and the environment.
///
/// # Examples
///
/// ```no_run
/// use uadash_config::loader::ConfigLoader;
///
/// let settings = ConfigLoader::new().load("uadash.yaml").unwrap();
/// println!("listening on {}", settings.server.socket_addr());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix.
    env_prefix: String,

    /// Whether environment overrides are applied.
    use_env: bool,

    /// Explicit environment, replacing the process environment.
    env_source: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    /// Creates a new configuration loader with default settings.
    pub fn new() -> Self {
        Self {
            env_prefix: ENV_PREFIX.to_string(),
            use_env: true,
            env_source: None,
        }
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment overrides.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.use_env = enabled;
        self
    }

    /// Reads overrides from `vars` instead of the process environment.
    pub fn with_env_source(mut self, vars: HashMap<String, String>) -> Self {
        self.env_source = Some(vars);
        self
    }

    /// Loads and validates settings from a file.
    ///
    /// The format is determined by the file extension (`.yaml`/`.yml`,
    /// `.toml`, `.json`).
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<Settings> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let format = ConfigFormat::from_path(path)?;
        let builder = Config::builder().add_source(
            File::from(path)
                .format(format.file_format())
                .required(true),
        );

        let settings = self
            .finish(builder)
            .map_err(|e| ConfigError::parse(path, e.to_string()))?;

        settings.validate()?;
        debug!(?settings, "Configuration loaded");
        Ok(settings)
    }

    /// Loads settings from defaults and the environment only.
    pub fn load_defaults(&self) -> ConfigResult<Settings> {
        let settings = self
            .finish(Config::builder())
            .map_err(|e| ConfigError::serialization(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads and validates settings from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<Settings> {
        let builder = Config::builder().add_source(File::from_str(content, format.file_format()));

        let settings = self
            .finish(builder)
            .map_err(|e| ConfigError::serialization(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    fn finish(
        &self,
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Settings, config::ConfigError> {
        let builder = if self.use_env {
            builder.add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(self.env_source.clone()),
            )
        } else {
            builder
        };

        builder.build()?.try_deserialize()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }

    fn file_format(&self) -> FileFormat {
        match self {
            ConfigFormat::Yaml => FileFormat::Yaml,
            ConfigFormat::Toml => FileFormat::Toml,
            ConfigFormat::Json => FileFormat::Json,
        }
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads settings from a file with default loader settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    ConfigLoader::new().load(path)
}

/// Renders settings as TOML, e.g. for `uadash validate --show`.
pub fn to_toml_string(settings: &Settings) -> ConfigResult<String> {
    toml::to_string_pretty(settings).map_err(|e| ConfigError::serialization(e.to_string()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{LogFormat, LogLevel};
    use std::io::Write;

    fn loader() -> ConfigLoader {
        ConfigLoader::new().with_env_source(HashMap::new())
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "server:\n  port: 8088\nhistory:\n  record_reads: true\nlogging:\n  level: debug\n  format: json"
        )
        .unwrap();

        let settings = loader().load(file.path()).unwrap();
        assert_eq!(settings.server.port, 8088);
        assert!(settings.history.record_reads);
        assert_eq!(settings.logging.level, LogLevel::Debug);
        assert_eq!(settings.logging.format, LogFormat::Json);
        // Untouched sections keep their defaults.
        assert_eq!(settings.storage.dashboard_path.to_str(), Some("config.json"));
    }

    #[test]
    fn test_load_toml_str() {
        let settings = loader()
            .load_from_str(
                "[session]\ninvalidate_on_conversion_error = false\n",
                ConfigFormat::Toml,
            )
            .unwrap();
        assert!(!settings.session.invalidate_on_conversion_error);
    }

    #[test]
    fn test_env_override() {
        let mut env = HashMap::new();
        env.insert("UADASH_SERVER__PORT".to_string(), "9191".to_string());
        env.insert("UADASH_HISTORY__RECORD_READS".to_string(), "true".to_string());

        let settings = ConfigLoader::new()
            .with_env_source(env)
            .load_from_str("server:\n  port: 8000\n", ConfigFormat::Yaml)
            .unwrap();
        assert_eq!(settings.server.port, 9191);
        assert!(settings.history.record_reads);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = loader()
            .load_from_str("{\"server\": {\"port\": 0}}", ConfigFormat::Json)
            .unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_missing_file() {
        let err = loader().load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("a.TOML")).unwrap(),
            ConfigFormat::Toml
        );
        assert!(ConfigFormat::from_path(Path::new("a.ini")).is_err());
    }

    #[test]
    fn test_toml_rendering() {
        let text = to_toml_string(&Settings::default()).unwrap();
        assert!(text.contains("[server]"));
    }
}
