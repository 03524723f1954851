// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Historical data for the uadash dashboard.
//!
//! Samples are kept in an append-only log and queried by node and optional
//! inclusive time window. The query engine is a pure function and shares no
//! state with the OPC UA session.
//!
//! ```
//! use uadash_history::{parse_bound, query, HistoricalSample};
//!
//! let log = vec![
//!     HistoricalSample::new("T1", "2024-05-01T09:00:00", "1"),
//!     HistoricalSample::new("T1", "2024-05-01T10:00:00", "2"),
//!     HistoricalSample::new("T1", "2024-05-01T11:00:00", "3"),
//! ];
//!
//! let start = parse_bound("start_time", Some("2024-05-01T09:30:00")).unwrap();
//! let end = parse_bound("end_time", Some("2024-05-01T10:30:00")).unwrap();
//!
//! let hits = query(&log, "T1", start, end);
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].value, "2");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod log;
pub mod query;
pub mod sample;

pub use error::{HistoryError, HistoryResult};
pub use log::{JsonLinesLog, MemoryLog, SampleLog};
pub use query::{parse_bound, query};
pub use sample::{format_timestamp, parse_timestamp, HistoricalSample};
