// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use std::path::Path;

use uadash_config::{DashboardConfig, Settings};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;
    let file_exists = config_path.exists();

    if args.strict && !file_exists {
        return Err(BinError::config(format!(
            "Settings file not found: {}",
            config_path.display()
        )));
    }

    let settings = cli
        .load_settings()
        .map_err(|e| BinError::config(format!("Settings validation failed: {}", e)))?;

    let mut warnings = collect_warnings(&settings);
    if !file_exists {
        warnings.insert(
            0,
            format!(
                "Settings file not found, using defaults: {}",
                config_path.display()
            ),
        );
    }
    let endpoint = dashboard_endpoint(&settings.storage.dashboard_path, &mut warnings);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Settings are valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  API:            {}", settings.server.socket_addr());
            println!("  Dashboard file: {}", settings.storage.dashboard_path.display());
            println!("  History log:    {}", settings.storage.history_path.display());
            println!("  Record reads:   {}", settings.history.record_reads);
            println!(
                "  OPC UA:         {}",
                endpoint.as_deref().unwrap_or("(not configured)")
            );

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed settings:");
                println!(
                    "{}",
                    serde_json::to_string_pretty(&settings)
                        .unwrap_or_else(|_| "(serialization error)".to_string())
                );
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "api_address": settings.server.socket_addr().to_string(),
                    "dashboard_path": settings.storage.dashboard_path.display().to_string(),
                    "history_path": settings.storage.history_path.display().to_string(),
                    "record_reads": settings.history.record_reads,
                    "opcua_endpoint": endpoint,
                },
                "warnings": warnings,
                "settings": if args.show_config { Some(&settings) } else { None },
            });
            let text = serde_json::to_string_pretty(&output)
                .map_err(|e| BinError::runtime(format!("Failed to render report: {}", e)))?;
            println!("{}", text);
        }
    }

    Ok(())
}

/// Checks file locations referenced by the settings.
fn collect_warnings(settings: &Settings) -> Vec<String> {
    let mut warnings = Vec::new();

    for (label, path) in [
        ("Dashboard file", &settings.storage.dashboard_path),
        ("History log", &settings.storage.history_path),
    ] {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                warnings.push(format!(
                    "{} directory does not exist: {}",
                    label,
                    parent.display()
                ));
            }
        }
    }

    if !cfg!(feature = "real-transport") {
        warnings.push("Built without OPC UA transport; connects will fail".to_string());
    }

    warnings
}

/// Reads the configured endpoint from an existing dashboard document.
fn dashboard_endpoint(path: &Path, warnings: &mut Vec<String>) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<DashboardConfig>(&text) {
        Ok(doc) => doc.endpoint().map(|e| e.url),
        Err(e) => {
            warnings.push(format!(
                "Dashboard file {} is not valid JSON: {}",
                path.display(),
                e
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_endpoint_reads_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"opcua_endpoint": "opc.tcp://plc:4840"}"#).unwrap();

        let mut warnings = Vec::new();
        assert_eq!(
            dashboard_endpoint(&path, &mut warnings).as_deref(),
            Some("opc.tcp://plc:4840")
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_dashboard_endpoint_flags_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut warnings = Vec::new();
        assert!(dashboard_endpoint(&path, &mut warnings).is_none());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_missing_directories_warned() {
        let mut settings = Settings::default();
        settings.storage.history_path = "/nonexistent/uadash/history.jsonl".into();

        let warnings = collect_warnings(&settings);
        assert!(warnings.iter().any(|w| w.contains("History log directory")));
    }
}
