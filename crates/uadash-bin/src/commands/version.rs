// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Executes the `version` command to display version information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("uadash - OPC UA tag dashboard backend");
    println!();
    println!("Version Information:");
    println!("  uadash-bin:     {}", env!("CARGO_PKG_VERSION"));
    println!("  uadash-api:     {}", uadash_api::VERSION);
    println!("  uadash-config:  {}", uadash_config::VERSION);
    println!();
    println!("Build Information:");
    println!("  Target:         {}", std::env::consts::ARCH);
    println!("  OS:             {}", std::env::consts::OS);
    println!();
    println!("Features:");
    println!(
        "  OPC UA transport: {}",
        if cfg!(feature = "real-transport") { "enabled" } else { "disabled" }
    );
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
