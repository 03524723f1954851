// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA error types for the session manager.
//!
//! Errors are split by what the caller can do about them:
//!
//! ```text
//! OpcUaError
//! ├── Configuration - No endpoint configured (operator action required)
//! ├── Connection    - Connect attempt failed or was cancelled (retryable)
//! ├── Operation     - Read/write failed on an established session
//! └── Conversion    - Caller value could not be coerced to the wire type
//! ```
//!
//! # Examples
//!
//! ```
//! use uadash_opcua::error::{OpcUaError, ConnectionError};
//!
//! let error = OpcUaError::connection(ConnectionError::refused(
//!     "opc.tcp://localhost:4840",
//!     "connection refused",
//! ));
//!
//! assert!(error.is_retryable());
//! assert_eq!(error.category(), "connection");
//! ```

use std::fmt;

use thiserror::Error;
use tracing::Level;

/// Result type alias for OPC UA operations.
pub type OpcUaResult<T> = Result<T, OpcUaError>;

// =============================================================================
// OpcUaError - Main Error Type
// =============================================================================

/// The main error type for OPC UA operations.
#[derive(Debug, Error)]
pub enum OpcUaError {
    /// Endpoint configuration errors.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// Connection-related errors.
    #[error("{0}")]
    Connection(#[from] ConnectionError),

    /// Read/write operation errors.
    #[error("{0}")]
    Operation(#[from] OperationError),

    /// Value coercion errors.
    #[error("{0}")]
    Conversion(#[from] ConversionError),
}

impl OpcUaError {
    // =========================================================================
    // Factory Methods
    // =========================================================================

    /// Creates a configuration error.
    #[inline]
    pub fn configuration(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(error: ConnectionError) -> Self {
        Self::Connection(error)
    }

    /// Creates an operation error.
    #[inline]
    pub fn operation(error: OperationError) -> Self {
        Self::Operation(error)
    }

    /// Creates a conversion error.
    #[inline]
    pub fn conversion(error: ConversionError) -> Self {
        Self::Conversion(error)
    }

    /// Creates an endpoint missing error.
    pub fn endpoint_missing() -> Self {
        Self::Configuration(ConfigurationError::EndpointMissing)
    }


    /// Creates a read failed error.
    pub fn read_failed(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Operation(OperationError::read_failed(node_id, message))
    }

    /// Creates a write failed error.
    pub fn write_failed(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Operation(OperationError::write_failed(node_id, message))
    }

    // =========================================================================
    // Error Properties
    // =========================================================================

    /// Returns `true` if re-issuing the request may succeed.
    ///
    /// Connection failures are retryable because the next request triggers a
    /// fresh connect. Operation failures are retryable for the same reason:
    /// the session has been invalidated and will be rebuilt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(e) => e.is_retryable(),
            Self::Operation(_) => true,
            Self::Configuration(_) | Self::Conversion(_) => false,
        }
    }

    /// Returns `true` if the session could not be (re)established.
    ///
    /// These errors surface to HTTP clients as "service unavailable".
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Connection(_))
    }

    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Configuration(_) => ErrorSeverity::Warning,
            Self::Connection(e) => e.severity(),
            Self::Operation(_) => ErrorSeverity::Error,
            Self::Conversion(_) => ErrorSeverity::Warning,
        }
    }

    /// Returns the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Connection(_) => "connection",
            Self::Operation(_) => "operation",
            Self::Conversion(_) => "conversion",
        }
    }

    /// Returns a unique error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Configuration(e) => e.error_code(),
            Self::Connection(e) => e.error_code(),
            Self::Operation(e) => e.error_code(),
            Self::Conversion(e) => e.error_code(),
        }
    }

    /// Returns recovery hints for this error.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Configuration(e) => e.recovery_hints(),
            Self::Connection(e) => e.recovery_hints(),
            Self::Operation(e) => e.recovery_hints(),
            Self::Conversion(e) => e.recovery_hints(),
        }
    }

    /// Returns the node reference this error is about, if any.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::Operation(e) => Some(e.node_id()),
            _ => None,
        }
    }

    /// Returns the tracing level for this error.
    pub fn tracing_level(&self) -> Level {
        self.severity().to_tracing_level()
    }

    /// Logs this error with appropriate level and context.
    pub fn log(&self, context: &str) {
        let code = self.error_code();

        match self.tracing_level() {
            Level::ERROR => tracing::error!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
            Level::WARN => tracing::warn!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
            _ => tracing::debug!(
                error_code = %code,
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
        }
    }
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Endpoint configuration errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No endpoint URL is configured.
    #[error("OPC UA endpoint not configured")]
    EndpointMissing,
}

impl ConfigurationError {
    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::EndpointMissing => ErrorCode::new(8, 1),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::EndpointMissing => vec!["Configure an endpoint via POST /api/config/endpoint"],
        }
    }
}

// =============================================================================
// ConnectionError
// =============================================================================

/// Connection-related errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The server refused or failed the connect attempt.
    #[error("Failed to connect to '{endpoint}': {message}")]
    Refused {
        /// Target endpoint.
        endpoint: String,
        /// Underlying error message.
        message: String,
    },

    /// The connect attempt was cancelled before completing.
    #[error("Connection attempt to '{endpoint}' was cancelled")]
    Cancelled {
        /// Target endpoint.
        endpoint: String,
    },

    /// No transport is available for this build.
    #[error("No OPC UA transport available: {reason}")]
    TransportUnavailable {
        /// Reason.
        reason: String,
    },
}

impl ConnectionError {
    /// Creates a connection refused error.
    pub fn refused(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Refused {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a cancelled connection error.
    pub fn cancelled(endpoint: impl Into<String>) -> Self {
        Self::Cancelled {
            endpoint: endpoint.into(),
        }
    }

    /// Creates a transport unavailable error.
    pub fn transport_unavailable(reason: impl Into<String>) -> Self {
        Self::TransportUnavailable {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::TransportUnavailable { .. })
    }

    /// Returns the severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cancelled { .. } => ErrorSeverity::Warning,
            Self::Refused { .. } => ErrorSeverity::Error,
            Self::TransportUnavailable { .. } => ErrorSeverity::Critical,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Refused { .. } => ErrorCode::new(1, 1),
            Self::Cancelled { .. } => ErrorCode::new(1, 2),
            Self::TransportUnavailable { .. } => ErrorCode::new(1, 3),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Refused { .. } => vec![
                "Check if the OPC UA server is running",
                "Verify the endpoint URL is correct",
                "Check firewall rules allow the connection",
            ],
            Self::Cancelled { .. } => vec!["Retry the request"],
            Self::TransportUnavailable { .. } => {
                vec!["Rebuild with the `real-transport` feature enabled"]
            }
        }
    }
}

// =============================================================================
// OperationError
// =============================================================================

/// Read/write operation errors.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Read operation failed.
    #[error("Failed to read node {node_id}: {message}")]
    ReadFailed {
        /// Node reference.
        node_id: String,
        /// Error message.
        message: String,
    },

    /// Write operation failed.
    #[error("Failed to write to node {node_id}: {message}")]
    WriteFailed {
        /// Node reference.
        node_id: String,
        /// Error message.
        message: String,
    },

    /// The server answered with a bad status code.
    #[error("Bad status code {status_code:#010x} for node {node_id}")]
    BadStatus {
        /// Node reference.
        node_id: String,
        /// OPC UA status code.
        status_code: u32,
    },

    /// The operation was cancelled while in flight.
    #[error("OPC UA {operation} operation cancelled for {node_id}")]
    Cancelled {
        /// Node reference.
        node_id: String,
        /// "read" or "write".
        operation: &'static str,
    },
}

impl OperationError {
    /// Creates a read failed error.
    pub fn read_failed(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReadFailed {
            node_id: node_id.into(),
            message: message.into(),
        }
    }

    /// Creates a write failed error.
    pub fn write_failed(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WriteFailed {
            node_id: node_id.into(),
            message: message.into(),
        }
    }

    /// Creates a bad status error.
    pub fn bad_status(node_id: impl Into<String>, status_code: u32) -> Self {
        Self::BadStatus {
            node_id: node_id.into(),
            status_code,
        }
    }

    /// Creates a cancelled operation error.
    pub fn cancelled(node_id: impl Into<String>, operation: &'static str) -> Self {
        Self::Cancelled {
            node_id: node_id.into(),
            operation,
        }
    }

    /// Returns the node reference.
    pub fn node_id(&self) -> &str {
        match self {
            Self::ReadFailed { node_id, .. }
            | Self::WriteFailed { node_id, .. }
            | Self::BadStatus { node_id, .. }
            | Self::Cancelled { node_id, .. } => node_id,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ReadFailed { .. } => ErrorCode::new(5, 1),
            Self::WriteFailed { .. } => ErrorCode::new(5, 2),
            Self::BadStatus { .. } => ErrorCode::new(5, 3),
            Self::Cancelled { .. } => ErrorCode::new(5, 4),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::BadStatus { .. } => vec![
                "Verify the node exists and is accessible",
                "Check the node's access level",
            ],
            _ => vec![
                "The session was reset; retry the request",
                "Verify the node identifier is correct",
            ],
        }
    }
}

// =============================================================================
// ConversionError
// =============================================================================

/// Value coercion errors.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The value cannot be parsed as the target type.
    #[error("Invalid value for type '{target_type}': {message}")]
    InvalidValue {
        /// Target type.
        target_type: String,
        /// Error message.
        message: String,
    },

    /// The value does not fit the target type.
    #[error("Value overflow: {value} exceeds range for {target_type}")]
    Overflow {
        /// The value that overflowed.
        value: String,
        /// Target type.
        target_type: String,
    },

    /// The value carries a fractional part but the target is an integer.
    #[error("Value {value} is not an integer (target {target_type})")]
    Fractional {
        /// The offending value.
        value: String,
        /// Target type.
        target_type: String,
    },
}

impl ConversionError {
    /// Creates an invalid value error.
    pub fn invalid_value(target_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            target_type: target_type.into(),
            message: message.into(),
        }
    }

    /// Creates an overflow error.
    pub fn overflow(value: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self::Overflow {
            value: value.into(),
            target_type: target_type.into(),
        }
    }

    /// Creates a fractional value error.
    pub fn fractional(value: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self::Fractional {
            value: value.into(),
            target_type: target_type.into(),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidValue { .. } => ErrorCode::new(7, 1),
            Self::Overflow { .. } => ErrorCode::new(7, 2),
            Self::Fractional { .. } => ErrorCode::new(7, 3),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        vec![
            "Check the value matches the node's data type",
            "Numeric nodes require a parseable number",
        ]
    }
}

// =============================================================================
// ErrorSeverity
// =============================================================================

/// Error severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Informational - no action required.
    Info,
    /// Warning - action may be required.
    Warning,
    /// Error - action required, but recoverable.
    Error,
    /// Critical - immediate action required.
    Critical,
}

impl ErrorSeverity {
    /// Converts to tracing level.
    pub fn to_tracing_level(self) -> Level {
        match self {
            Self::Info => Level::INFO,
            Self::Warning => Level::WARN,
            Self::Error | Self::Critical => Level::ERROR,
        }
    }

    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// ErrorCode
// =============================================================================

/// Structured error code for categorization.
///
/// Format: `UA-XXYY` where XX is category and YY is specific error.
///
/// Categories:
/// - 1: Connection
/// - 5: Operation
/// - 7: Conversion
/// - 8: Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// Category.
    pub category: u8,
    /// Specific error within category.
    pub code: u8,
}

impl ErrorCode {
    /// Creates a new error code.
    pub const fn new(category: u8, code: u8) -> Self {
        Self { category, code }
    }

    /// Returns the full error code as a u16.
    pub fn as_u16(&self) -> u16 {
        ((self.category as u16) << 8) | (self.code as u16)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UA-{:02X}{:02X}", self.category, self.code)
    }
}

// =============================================================================
// Tests
// =============================================================================
