// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA session management for the uadash dashboard.
//!
//! This crate owns the single outbound OPC UA connection of the dashboard
//! backend. It decides when to reuse or rebuild the session, serializes
//! connect attempts, coerces dashboard values into typed variants on write
//! and tears the session down on any protocol failure.
//!
//! # Error Handling
//!
//! ```text
//! OpcUaError
//! ├── Configuration - No endpoint configured
//! ├── Connection    - Connect failed, cancelled or not connected
//! ├── Operation     - Read/write failure on a live session
//! └── Conversion    - Value does not fit the node's data type
//! ```
//!
//! # Features
//!
//! - `real-transport`: enables [`client::RealOpcUaConnector`] backed by the
//!   `opcua` crate. Without it, [`client::UnavailableConnector`] is the only
//!   built-in connector.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use uadash_config::StaticEndpoint;
//! use uadash_opcua::client::{SessionManager, UnavailableConnector};
//! use uadash_opcua::NodeRef;
//!
//! let endpoints = Arc::new(StaticEndpoint::new(Some("opc.tcp://localhost:4840")));
//! let manager = SessionManager::new(Arc::new(UnavailableConnector), endpoints);
//!
//! let value = manager.read(&NodeRef::new("ns=2;s=Tank.Level")).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod types;

pub use client::{
    OpcUaConnector, OpcUaTransport, OpcUaValue, SessionManager, SessionStats, SessionStatus,
    UnavailableConnector,
};
pub use error::{
    ConfigurationError, ConnectionError, ConversionError, ErrorCode, ErrorSeverity, OpcUaError,
    OpcUaResult, OperationError,
};
pub use types::{ClientSettings, NodeRef, OpcUaDataType, SessionPolicy, SessionState};
