// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uadash-bin
//!
//! Command-line entry point for the uadash dashboard backend.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         uadash                               │
//! │   cli ─► commands ─► runtime ─► shutdown                     │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!        ┌──────────────────────┼───────────────────────┐
//!        ▼                      ▼                       ▼
//! ┌──────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │ uadash-api   │     │ uadash-opcua    │     │ uadash-history  │
//! │ (axum HTTP)  │────►│ SessionManager  │     │ sample log      │
//! └──────────────┘     └─────────────────┘     └─────────────────┘
//!        │                      │
//!        ▼                      ▼
//! ┌──────────────────────────────────────┐
//! │ uadash-config (settings + dashboard) │
//! └──────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use runtime::{DashboardRuntime, RuntimeBuilder};
pub use shutdown::ShutdownCoordinator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Binary name
pub const NAME: &str = "uadash";
