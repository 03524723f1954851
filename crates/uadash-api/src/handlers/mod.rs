// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: liveness and readiness
//! - [`node_value`]: live reads and writes through the OPC UA session
//! - [`history`]: historical sample queries
//! - [`dashboard`]: endpoint, document and layouts
//! - [`nodes`] / [`groups`]: widget and group records
//! - [`session`]: connection status and manual connect/disconnect

mod dashboard;
mod groups;
mod health;
mod history;
mod node_value;
mod nodes;
mod session;

pub use dashboard::*;
pub use groups::*;
pub use health::*;
pub use history::*;
pub use node_value::*;
pub use nodes::*;
pub use session::*;
