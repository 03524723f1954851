// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core OPC UA types for the session manager.
//!
//! - **NodeRef**: Opaque node identifier passed through to the server
//! - **OpcUaDataType**: Built-in data types observed on the wire
//! - **SessionState**: Lifecycle state of the managed session
//! - **ClientSettings**: Client identity and timeouts for the real transport
//! - **SessionPolicy**: Failure-recovery switches
//!
//! # Examples
//!
//! ```
//! use uadash_opcua::types::{NodeRef, SessionState};
//!
//! let node = NodeRef::new("ns=2;s=Tank.Level");
//! assert_eq!(node.as_str(), "ns=2;s=Tank.Level");
//! assert!(!SessionState::Disconnected.is_connected());
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// =============================================================================
// NodeRef
// =============================================================================

/// Opaque OPC UA node identifier string, e.g. `ns=2;s=Tank.Level`.
///
/// The session manager never validates it; the server is the authority.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeRef(String);

impl NodeRef {
    /// Creates a node reference.
    pub fn new(node_id: impl Into<String>) -> Self {
        Self(node_id.into())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the reference, returning the identifier.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for NodeRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// OpcUaDataType
// =============================================================================

/// OPC UA built-in data types.
///
/// Only `Boolean`, `Int32`, `Int64`, `Float`, `Double` and `String` are ever
/// produced by the write path; the rest can be observed on reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OpcUaDataType {
    /// Boolean value.
    Boolean,

    /// Signed 8-bit integer.
    SByte,

    /// Unsigned 8-bit integer.
    Byte,

    /// Signed 16-bit integer.
    Int16,

    /// Unsigned 16-bit integer.
    UInt16,

    /// Signed 32-bit integer.
    Int32,

    /// Unsigned 32-bit integer.
    UInt32,

    /// Signed 64-bit integer.
    Int64,

    /// Unsigned 64-bit integer.
    UInt64,

    /// 32-bit IEEE 754 float.
    Float,

    /// 64-bit IEEE 754 double.
    Double,

    /// UTF-8 string.
    String,

    /// Date and time.
    DateTime,

    /// GUID.
    Guid,

    /// Raw byte string.
    ByteString,

    /// Array or empty variant.
    #[default]
    Variant,
}

impl OpcUaDataType {
    /// Returns the OPC UA type ID for built-in types.
    pub const fn type_id(&self) -> u32 {
        match self {
            Self::Boolean => 1,
            Self::SByte => 2,
            Self::Byte => 3,
            Self::Int16 => 4,
            Self::UInt16 => 5,
            Self::Int32 => 6,
            Self::UInt32 => 7,
            Self::Int64 => 8,
            Self::UInt64 => 9,
            Self::Float => 10,
            Self::Double => 11,
            Self::String => 12,
            Self::DateTime => 13,
            Self::Guid => 14,
            Self::ByteString => 15,
            Self::Variant => 24,
        }
    }

    /// Returns `true` if the write path has a dedicated coercion for this type.
    pub const fn is_writable_kind(&self) -> bool {
        matches!(
            self,
            Self::Boolean | Self::Int32 | Self::Int64 | Self::Float | Self::Double | Self::String
        )
    }

    /// Returns the canonical type name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::SByte => "SByte",
            Self::Byte => "Byte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::String => "String",
            Self::DateTime => "DateTime",
            Self::Guid => "Guid",
            Self::ByteString => "ByteString",
            Self::Variant => "Variant",
        }
    }
}

impl fmt::Display for OpcUaDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// SessionState
// =============================================================================

/// Lifecycle state of the managed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session.
    #[default]
    Disconnected,

    /// A connect attempt is in flight.
    Connecting,

    /// A session is established and bound to an endpoint.
    Connected,
}

impl SessionState {
    /// Returns `true` if a session is established.
    #[inline]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` while a connect attempt is running.
    #[inline]
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::Connecting)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}

// =============================================================================
// ClientSettings
// =============================================================================

/// Client identity and timeouts used when opening a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Application name announced to the server.
    pub application_name: String,

    /// Application URI announced to the server.
    pub application_uri: String,

    /// Requested session timeout.
    #[serde(with = "duration_millis")]
    pub session_timeout: Duration,

    /// Accept untrusted server certificates.
    pub trust_server_certs: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            application_name: "uadash".to_string(),
            application_uri: "urn:uadash:client".to_string(),
            session_timeout: Duration::from_secs(60),
            trust_server_certs: true,
        }
    }
}

// =============================================================================
// SessionPolicy
// =============================================================================

/// Failure-recovery switches for the session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionPolicy {
    /// Tear down the session when a written value cannot be coerced.
    ///
    /// A coercion failure says nothing about the connection, but the
    /// dashboard has always treated every write failure alike, so this
    /// stays on unless switched off.
    pub invalidate_on_conversion_error: bool,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            invalidate_on_conversion_error: true,
        }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ref_is_transparent() {
        let node = NodeRef::new("ns=2;s=Tank.Level");
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, "\"ns=2;s=Tank.Level\"");
        assert_eq!(node.to_string(), "ns=2;s=Tank.Level");
    }

    #[test]
    fn test_writable_kinds() {
        assert!(OpcUaDataType::Int32.is_writable_kind());
        assert!(OpcUaDataType::String.is_writable_kind());
        assert!(!OpcUaDataType::UInt16.is_writable_kind());
        assert!(!OpcUaDataType::Variant.is_writable_kind());
        assert_eq!(OpcUaDataType::Double.type_id(), 11);
    }

    #[test]
    fn test_session_state() {
        assert_eq!(SessionState::default(), SessionState::Disconnected);
        assert!(SessionState::Connected.is_connected());
        assert!(SessionState::Connecting.is_connecting());
        assert_eq!(
            serde_json::to_string(&SessionState::Connected).unwrap(),
            "\"connected\""
        );
    }

    #[test]
    fn test_client_settings_defaults() {
        let settings: ClientSettings = serde_json::from_str(r#"{"session_timeout": 5000}"#).unwrap();
        assert_eq!(settings.session_timeout, Duration::from_secs(5));
        assert_eq!(settings.application_name, "uadash");
        assert!(SessionPolicy::default().invalidate_on_conversion_error);
    }
}
