// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the dashboard server (default)
//! - `validate`: Validate the settings file
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use uadash_config::{ConfigLoader, ConfigResult, LoggingConfig, Settings};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// uadash - OPC UA tag dashboard backend
///
/// Serves the dashboard HTTP API, keeps one OPC UA session to the configured
/// server and answers historical queries from the sample log.
#[derive(Parser, Debug)]
#[command(
    name = "uadash",
    author = "Sylvex <contact@sylvex.io>",
    version = uadash_api::VERSION,
    about = "OPC UA tag dashboard backend",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Settings file path
    #[arg(
        short,
        long,
        default_value = "uadash.yaml",
        env = "UADASH_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the settings file
    #[arg(short, long, env = "UADASH_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log format; overrides the settings file
    #[arg(long, env = "UADASH_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the uadash CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the dashboard server
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Validate the settings file
    ///
    /// Parses and validates the settings without starting the server.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Override the listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Open the OPC UA session at startup instead of on first use
    #[arg(long)]
    pub connect_on_start: bool,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show parsed settings after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Fail when the settings file does not exist
    #[arg(long)]
    pub strict: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<uadash_config::LogFormat> for LogFormat {
    fn from(format: uadash_config::LogFormat) -> Self {
        match format {
            uadash_config::LogFormat::Text => Self::Text,
            uadash_config::LogFormat::Json => Self::Json,
            uadash_config::LogFormat::Compact => Self::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Check if verbose logging is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Get the effective log level based on flags, then the settings file.
    pub fn effective_log_level<'a>(&'a self, logging: &'a LoggingConfig) -> &'a str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else if let Some(level) = &self.log_level {
            level
        } else {
            logging.level.as_str()
        }
    }

    /// Get the effective log format, falling back to the settings file.
    pub fn effective_log_format(&self, logging: &LoggingConfig) -> LogFormat {
        self.log_format.unwrap_or_else(|| logging.format.into())
    }

    /// Loads settings from the configured file.
    ///
    /// A missing file is not an error: defaults plus `UADASH_*` environment
    /// overrides are used instead.
    pub fn load_settings(&self) -> ConfigResult<Settings> {
        let loader = ConfigLoader::new();
        if self.config.exists() {
            loader.load(&self.config)
        } else {
            loader.load_defaults()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uadash_config::LogLevel;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["uadash"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.effective_command(), Commands::Run(_)));
    }

    #[test]
    fn test_run_command_with_port() {
        let cli = Cli::parse_from(["uadash", "run", "--port", "8080", "--connect-on-start"]);
        if let Some(Commands::Run(args)) = cli.command {
            assert_eq!(args.port, Some(8080));
            assert!(args.connect_on_start);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["uadash", "validate", "--show-config", "-f", "json"]);
        if let Some(Commands::Validate(args)) = cli.command {
            assert!(args.show_config);
            assert_eq!(args.format, OutputFormat::Json);
        } else {
            panic!("Expected Validate command");
        }
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["uadash", "-c", "/etc/uadash/settings.toml"]);
        assert_eq!(cli.config, PathBuf::from("/etc/uadash/settings.toml"));
    }

    #[test]
    fn test_log_level_falls_back_to_settings() {
        let logging = LoggingConfig {
            level: LogLevel::Error,
            ..Default::default()
        };

        let cli = Cli::parse_from(["uadash"]);
        assert_eq!(cli.effective_log_level(&logging), "error");

        let cli = Cli::parse_from(["uadash", "-l", "trace"]);
        assert_eq!(cli.effective_log_level(&logging), "trace");
    }

    #[test]
    fn test_quiet_and_verbose() {
        let logging = LoggingConfig::default();

        let cli = Cli::parse_from(["uadash", "-q"]);
        assert_eq!(cli.effective_log_level(&logging), "warn");

        let cli = Cli::parse_from(["uadash", "-v"]);
        assert!(cli.is_verbose());
        assert_eq!(cli.effective_log_level(&logging), "debug");
    }

    #[test]
    fn test_log_format_override() {
        let logging = LoggingConfig {
            format: uadash_config::LogFormat::Json,
            ..Default::default()
        };

        let cli = Cli::parse_from(["uadash"]);
        assert_eq!(cli.effective_log_format(&logging), LogFormat::Json);

        let cli = Cli::parse_from(["uadash", "--log-format", "compact"]);
        assert_eq!(cli.effective_log_format(&logging), LogFormat::Compact);
    }

    #[test]
    fn test_missing_settings_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let cli = Cli::parse_from(["uadash", "-c", path.to_str().unwrap()]);

        let settings = cli.load_settings().unwrap();
        assert_eq!(settings.server.port, uadash_config::schema::DEFAULT_PORT);
    }
}
