// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! History error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the sample log and query engine.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// A timestamp did not match any accepted form.
    #[error("Malformed timestamp '{value}'")]
    MalformedTimestamp {
        /// The rejected text.
        value: String,
    },

    /// A query bound could not be parsed.
    #[error("Invalid {bound} '{value}': expected an ISO-8601 timestamp")]
    InvalidBound {
        /// Bound name (`start_time` or `end_time`).
        bound: &'static str,
        /// The rejected text.
        value: String,
    },

    /// Log file I/O error.
    #[error("Failed to access history log '{path}': {source}")]
    Io {
        /// Path to the log file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A sample could not be serialized.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },
}

impl HistoryError {
    /// Creates a malformed timestamp error.
    pub fn malformed_timestamp(value: impl Into<String>) -> Self {
        Self::MalformedTimestamp {
            value: value.into(),
        }
    }

    /// Creates an invalid bound error.
    pub fn invalid_bound(bound: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidBound {
            bound,
            value: value.into(),
        }
    }

    /// Creates an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Returns `true` if the caller supplied bad input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidBound { .. })
    }
}

/// Result type for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;
