// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Historical samples and timestamp parsing.
//!
//! Accepted timestamp forms:
//!
//! | Form                              | Example                          |
//! |-----------------------------------|----------------------------------|
//! | RFC 3339 with offset              | `2024-05-01T10:00:00+02:00`      |
//! | RFC 3339, space separator         | `2024-05-01 10:00:00Z`           |
//! | Naive, `T` separator              | `2024-05-01T10:00:00.250`        |
//! | Naive, space separator            | `2024-05-01 10:00:00`            |
//! | Naive, minutes only               | `2024-05-01T10:00`               |
//! | Date only (midnight)              | `2024-05-01`                     |
//!
//! Offsets are normalized to UTC. Naive timestamps are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{HistoryError, HistoryResult};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parses a timestamp in any accepted form into UTC.
pub fn parse_timestamp(text: &str) -> HistoryResult<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    // `Z` with a space separator is not RFC 3339 but common in logs.
    let zulu = text.strip_suffix('Z').or_else(|| text.strip_suffix('z'));

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(zulu.unwrap_or(text), fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(HistoryError::malformed_timestamp(text))
}

/// Formats a UTC instant the way new samples are written.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One recorded value of one node.
///
/// The timestamp is kept as the original text; it is parsed only when a
/// query needs it, so a bad entry never prevents the log from loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalSample {
    /// OPC UA node identifier.
    pub node_id: String,

    /// ISO-8601 timestamp text.
    pub timestamp: String,

    /// Value as rendered on read.
    #[serde(deserialize_with = "value_as_string")]
    pub value: String,
}

impl HistoricalSample {
    /// Creates a sample.
    pub fn new(
        node_id: impl Into<String>,
        timestamp: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            timestamp: timestamp.into(),
            value: value.into(),
        }
    }

    /// Creates a sample stamped with the current time.
    pub fn now(node_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(node_id, format_timestamp(Utc::now()), value)
    }

    /// Parses this sample's timestamp.
    pub fn parsed_timestamp(&self) -> HistoryResult<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// Accepts scalar JSON values written by other tools.
fn value_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}
