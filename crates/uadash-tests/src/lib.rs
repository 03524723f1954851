// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uadash Integration Tests
//!
//! Shared helpers for the integration suites under `tests/`.
//!
//! - [`common::mocks`]: scripted OPC UA connector and transport
//! - [`common::fixtures`]: dashboard documents and sample series
//! - [`common::harness`]: a fully wired router over a temp directory
//!
//! ```bash
//! cargo test -p uadash-tests
//! cargo test -p uadash-tests --test integration_session
//! ```
//!
//! ```rust,ignore
//! use uadash_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_read() {
//!     let app = TestApp::connected("opc.tcp://plc:4840");
//!     app.connector.set_value("ns=2;s=Level", OpcUaValue::Double(4.5));
//!     let (status, body) = app.get("/api/node_value/ns=2;s=Level").await;
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
    pub use crate::common::{init_test_logging, temp_test_dir};
    pub use uadash_opcua::OpcUaValue;
}
