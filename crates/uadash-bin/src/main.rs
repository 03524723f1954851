// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! uadash - OPC UA tag dashboard backend.

use uadash_bin::cli::Cli;
use uadash_bin::error::report_error_and_exit;
use uadash_bin::logging::init_logging;
use uadash_config::LoggingConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // Logging settings come from the file when it parses; a broken file is
    // reported by the command itself.
    let logging = cli
        .load_settings()
        .map(|s| s.logging)
        .unwrap_or_else(|_| LoggingConfig::default());
    init_logging(
        cli.effective_log_level(&logging),
        cli.effective_log_format(&logging),
    );

    if let Err(e) = uadash_bin::commands::execute(cli).await {
        report_error_and_exit(e);
    }
}
