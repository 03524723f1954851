// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA client implementations.
//!
//! - **Transport Layer**: Connector and session traits, value model
//! - **Session Management**: Single-session lifecycle with failure recovery
//! - **Value Coercion**: Dashboard JSON to typed variants and back
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      SessionManager                             │
//! │        (ensure_connected / invalidate / read / write)           │
//! └─────────────────────────────────────────────────────────────────┘
//!             │                                   │
//!             ▼                                   ▼
//! ┌───────────────────────────┐     ┌───────────────────────────────┐
//! │     coercion              │     │  OpcUaConnector               │
//! │  (pure value mapping)     │     │   └─► OpcUaTransport          │
//! └───────────────────────────┘     └───────────────────────────────┘
//! ```

pub mod coercion;
pub mod session;
pub mod transport;

#[cfg(feature = "real-transport")]
pub mod real_transport;

pub use session::{SessionManager, SessionStats, SessionStatsSnapshot, SessionStatus};
pub use transport::{OpcUaConnector, OpcUaTransport, OpcUaValue, UnavailableConnector};

#[cfg(feature = "real-transport")]
pub use real_transport::{RealOpcUaConnector, RealOpcUaTransport};
