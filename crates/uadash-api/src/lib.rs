// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uadash-api
//!
//! HTTP API for the uadash OPC UA dashboard.
//!
//! Live reads and writes go through the shared
//! [`SessionManager`](uadash_opcua::SessionManager); widget, group and layout
//! edits go to the dashboard document store; historical queries run over
//! the sample log.
//!
//! ```rust,ignore
//! use uadash_api::{ApiServer, AppState};
//!
//! let state = AppState::builder()
//!     .settings(settings)
//!     .session(session)
//!     .store(store)
//!     .history(history)
//!     .build()?;
//!
//! ApiServer::new(state).run_with_shutdown(shutdown).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use server::ApiServer;
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
