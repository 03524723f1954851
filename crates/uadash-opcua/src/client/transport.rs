// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA transport abstraction layer.
//!
//! The session manager talks to the server only through these traits, so the
//! real `opcua` client and the test doubles are interchangeable.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::OpcUaResult;
use crate::types::{NodeRef, OpcUaDataType};

// =============================================================================
// OpcUaValue
// =============================================================================

/// OPC UA variant value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OpcUaValue {
    /// Boolean value.
    Boolean(bool),

    /// Signed byte.
    SByte(i8),

    /// Unsigned byte.
    Byte(u8),

    /// 16-bit signed integer.
    Int16(i16),

    /// 16-bit unsigned integer.
    UInt16(u16),

    /// 32-bit signed integer.
    Int32(i32),

    /// 32-bit unsigned integer.
    UInt32(u32),

    /// 64-bit signed integer.
    Int64(i64),

    /// 64-bit unsigned integer.
    UInt64(u64),

    /// 32-bit float.
    Float(f32),

    /// 64-bit double.
    Double(f64),

    /// String value.
    String(String),

    /// Date/time value.
    DateTime(chrono::DateTime<chrono::Utc>),

    /// GUID value.
    Guid(uuid::Uuid),

    /// Byte string.
    ByteString(Vec<u8>),

    /// Array of values.
    Array(Vec<OpcUaValue>),

    /// Empty variant.
    #[default]
    Null,
}

impl OpcUaValue {
    /// Returns the data type of this value.
    pub fn data_type(&self) -> OpcUaDataType {
        match self {
            Self::Boolean(_) => OpcUaDataType::Boolean,
            Self::SByte(_) => OpcUaDataType::SByte,
            Self::Byte(_) => OpcUaDataType::Byte,
            Self::Int16(_) => OpcUaDataType::Int16,
            Self::UInt16(_) => OpcUaDataType::UInt16,
            Self::Int32(_) => OpcUaDataType::Int32,
            Self::UInt32(_) => OpcUaDataType::UInt32,
            Self::Int64(_) => OpcUaDataType::Int64,
            Self::UInt64(_) => OpcUaDataType::UInt64,
            Self::Float(_) => OpcUaDataType::Float,
            Self::Double(_) => OpcUaDataType::Double,
            Self::String(_) => OpcUaDataType::String,
            Self::DateTime(_) => OpcUaDataType::DateTime,
            Self::Guid(_) => OpcUaDataType::Guid,
            Self::ByteString(_) => OpcUaDataType::ByteString,
            Self::Array(_) | Self::Null => OpcUaDataType::Variant,
        }
    }

    /// Returns `true` if this is an empty variant.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Attempts to get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to get the value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::SByte(v) => Some(*v as i64),
            Self::Byte(v) => Some(*v as i64),
            Self::Int16(v) => Some(*v as i64),
            Self::UInt16(v) => Some(*v as i64),
            Self::Int32(v) => Some(*v as i64),
            Self::UInt32(v) => Some(*v as i64),
            Self::Int64(v) => Some(*v),
            Self::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Attempts to get the value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Attempts to get the value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for OpcUaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{}", v),
            Self::SByte(v) => write!(f, "{}", v),
            Self::Byte(v) => write!(f, "{}", v),
            Self::Int16(v) => write!(f, "{}", v),
            Self::UInt16(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::UInt64(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::String(v) => f.write_str(v),
            Self::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Guid(v) => write!(f, "{}", v),
            Self::ByteString(v) => {
                f.write_str("0x")?;
                for byte in v {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Self::Null => write!(f, "null"),
        }
    }
}

// =============================================================================
// OpcUaTransport Trait
// =============================================================================

/// An established OPC UA session.
///
/// Every error returned here is treated by the session manager as a hard
/// failure of the session.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the session manager hands clones of
/// the same `Arc` to concurrent requests.
#[async_trait]
pub trait OpcUaTransport: Send + Sync {
    /// Reads the current value attribute of a node.
    async fn read_value(&self, node: &NodeRef) -> OpcUaResult<OpcUaValue>;

    /// Writes the value attribute of a node.
    async fn write_value(&self, node: &NodeRef, value: OpcUaValue) -> OpcUaResult<()>;

    /// Closes the session.
    async fn disconnect(&self) -> OpcUaResult<()>;

    /// Returns the endpoint URL this session is bound to.
    fn endpoint(&self) -> &str;
}

// =============================================================================
// OpcUaConnector Trait
// =============================================================================

/// Factory that opens sessions against an endpoint URL.
#[async_trait]
pub trait OpcUaConnector: Send + Sync {
    /// Opens a new session to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the server cannot be reached or refuses
    /// the session.
    async fn connect(&self, endpoint: &str) -> OpcUaResult<Arc<dyn OpcUaTransport>>;

    /// Returns a short name for logging.
    fn name(&self) -> &'static str {
        "opcua"
    }
}

// =============================================================================
// UnavailableConnector
// =============================================================================

/// Connector used when no transport is compiled in.
///
/// Every connect attempt fails with a non-retryable connection error.
#[derive(Debug, Clone, Default)]
pub struct UnavailableConnector;

#[async_trait]
impl OpcUaConnector for UnavailableConnector {
    async fn connect(&self, _endpoint: &str) -> OpcUaResult<Arc<dyn OpcUaTransport>> {
        Err(crate::error::ConnectionError::transport_unavailable(
            "built without the `real-transport` feature",
        )
        .into())
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

// =============================================================================
// Tests
// =============================================================================
