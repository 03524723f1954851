// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use tracing::info;

use crate::cli::{Cli, RunArgs};
use crate::error::BinResult;
use crate::runtime::RuntimeBuilder;

/// Executes the `run` command to start the dashboard server.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    info!(config = %cli.config.display(), "Starting uadash...");

    let runtime = RuntimeBuilder::new()
        .config_path(&cli.config)
        .port(args.port)
        .connect_on_start(args.connect_on_start)
        .build()?;

    runtime.run().await
}
