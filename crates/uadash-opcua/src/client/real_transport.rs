// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Real OPC UA transport using the `opcua` crate.
//!
//! The `opcua` client API is synchronous, so every call runs on the blocking
//! thread pool. Sessions are opened anonymously without message security.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use uadash_opcua::client::{RealOpcUaConnector, SessionManager};
//! use uadash_opcua::types::ClientSettings;
//!
//! let connector = Arc::new(RealOpcUaConnector::new(ClientSettings::default()));
//! let manager = SessionManager::new(connector, endpoints);
//! manager.ensure_connected().await?;
//! ```

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinError;
use tracing::{debug, info, trace};

use opcua::client::prelude::*;
use opcua::sync::RwLock as OpcUaRwLock;

use crate::client::transport::{OpcUaConnector, OpcUaTransport, OpcUaValue};
use crate::error::{ConnectionError, ConversionError, OpcUaError, OpcUaResult, OperationError};
use crate::types::{ClientSettings, NodeRef};

// =============================================================================
// RealOpcUaConnector
// =============================================================================

/// Opens sessions with the `opcua` client.
#[derive(Debug, Clone, Default)]
pub struct RealOpcUaConnector {
    settings: ClientSettings,
}

impl RealOpcUaConnector {
    /// Creates a connector with the given client settings.
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    /// Builds the OPC UA client from settings.
    fn build_client(settings: &ClientSettings, endpoint: &str) -> OpcUaResult<Client> {
        let mut builder = ClientBuilder::new()
            .application_name(settings.application_name.as_str())
            .application_uri(settings.application_uri.as_str())
            .session_retry_limit(0)
            .session_timeout(settings.session_timeout.as_millis() as u32);

        if settings.trust_server_certs {
            builder = builder.trust_server_certs(true);
        }

        builder.client().ok_or_else(|| {
            ConnectionError::refused(endpoint, "failed to build OPC UA client").into()
        })
    }
}

#[async_trait]
impl OpcUaConnector for RealOpcUaConnector {
    async fn connect(&self, endpoint: &str) -> OpcUaResult<Arc<dyn OpcUaTransport>> {
        let settings = self.settings.clone();
        let url = endpoint.to_string();

        let session = tokio::task::spawn_blocking(move || {
            let mut client = Self::build_client(&settings, &url)?;
            let description: EndpointDescription = (
                url.as_str(),
                SecurityPolicy::None.to_str(),
                MessageSecurityMode::None,
                UserTokenPolicy::anonymous(),
            )
                .into();

            client
                .connect_to_endpoint(description, IdentityToken::Anonymous)
                .map_err(|status| {
                    OpcUaError::from(ConnectionError::refused(&url, status.to_string()))
                })
        })
        .await
        .map_err(|e| join_error_on_connect(e, endpoint))??;

        info!(endpoint = %endpoint, "OPC UA session established");

        Ok(Arc::new(RealOpcUaTransport {
            endpoint: endpoint.to_string(),
            session,
        }))
    }

    fn name(&self) -> &'static str {
        "opcua"
    }
}

fn join_error_on_connect(e: JoinError, endpoint: &str) -> OpcUaError {
    if e.is_cancelled() {
        ConnectionError::cancelled(endpoint).into()
    } else {
        ConnectionError::refused(endpoint, format!("connect task failed: {}", e)).into()
    }
}

// =============================================================================
// RealOpcUaTransport
// =============================================================================

/// A live `opcua` session.
pub struct RealOpcUaTransport {
    endpoint: String,
    session: Arc<OpcUaRwLock<Session>>,
}

impl RealOpcUaTransport {
    fn parse_node_id(node: &NodeRef, operation: &'static str) -> OpcUaResult<NodeId> {
        NodeId::from_str(node.as_str()).map_err(|_| {
            let message = "invalid node identifier";
            match operation {
                "write" => OperationError::write_failed(node.as_str(), message).into(),
                _ => OperationError::read_failed(node.as_str(), message).into(),
            }
        })
    }

    /// Converts an opcua Variant to our OpcUaValue.
    fn from_opcua_variant(variant: &Variant) -> OpcUaValue {
        match variant {
            Variant::Empty => OpcUaValue::Null,
            Variant::Boolean(v) => OpcUaValue::Boolean(*v),
            Variant::SByte(v) => OpcUaValue::SByte(*v),
            Variant::Byte(v) => OpcUaValue::Byte(*v),
            Variant::Int16(v) => OpcUaValue::Int16(*v),
            Variant::UInt16(v) => OpcUaValue::UInt16(*v),
            Variant::Int32(v) => OpcUaValue::Int32(*v),
            Variant::UInt32(v) => OpcUaValue::UInt32(*v),
            Variant::Int64(v) => OpcUaValue::Int64(*v),
            Variant::UInt64(v) => OpcUaValue::UInt64(*v),
            Variant::Float(v) => OpcUaValue::Float(*v),
            Variant::Double(v) => OpcUaValue::Double(*v),
            Variant::String(v) => OpcUaValue::String(v.as_ref().to_string()),
            Variant::DateTime(v) => OpcUaValue::DateTime(v.as_chrono()),
            Variant::Guid(v) => OpcUaValue::Guid(uuid::Uuid::from_bytes(*v.as_bytes())),
            Variant::ByteString(v) => OpcUaValue::ByteString(v.value.clone().unwrap_or_default()),
            Variant::Array(arr) => {
                OpcUaValue::Array(arr.values.iter().map(Self::from_opcua_variant).collect())
            }
            other => OpcUaValue::String(format!("{:?}", other)),
        }
    }

    /// Converts a written value to an opcua Variant.
    ///
    /// Only the scalar kinds produced by write coercion are supported.
    fn to_opcua_variant(value: &OpcUaValue) -> OpcUaResult<Variant> {
        let variant = match value {
            OpcUaValue::Null => Variant::Empty,
            OpcUaValue::Boolean(v) => Variant::Boolean(*v),
            OpcUaValue::SByte(v) => Variant::SByte(*v),
            OpcUaValue::Byte(v) => Variant::Byte(*v),
            OpcUaValue::Int16(v) => Variant::Int16(*v),
            OpcUaValue::UInt16(v) => Variant::UInt16(*v),
            OpcUaValue::Int32(v) => Variant::Int32(*v),
            OpcUaValue::UInt32(v) => Variant::UInt32(*v),
            OpcUaValue::Int64(v) => Variant::Int64(*v),
            OpcUaValue::UInt64(v) => Variant::UInt64(*v),
            OpcUaValue::Float(v) => Variant::Float(*v),
            OpcUaValue::Double(v) => Variant::Double(*v),
            OpcUaValue::String(v) => Variant::String(UAString::from(v.as_str())),
            OpcUaValue::DateTime(v) => Variant::DateTime(Box::new(DateTime::from(*v))),
            other => {
                return Err(ConversionError::invalid_value(
                    other.data_type().name(),
                    "type cannot be written",
                )
                .into())
            }
        };
        Ok(variant)
    }
}

fn join_error_on_operation(e: JoinError, node: &NodeRef, operation: &'static str) -> OpcUaError {
    if e.is_cancelled() {
        OperationError::cancelled(node.as_str(), operation).into()
    } else if operation == "write" {
        OperationError::write_failed(node.as_str(), format!("task failed: {}", e)).into()
    } else {
        OperationError::read_failed(node.as_str(), format!("task failed: {}", e)).into()
    }
}

#[async_trait]
impl OpcUaTransport for RealOpcUaTransport {
    async fn read_value(&self, node: &NodeRef) -> OpcUaResult<OpcUaValue> {
        let node_id = Self::parse_node_id(node, "read")?;
        let session = Arc::clone(&self.session);
        let node_ref = node.clone();

        trace!(node_id = %node, "Reading node value");

        tokio::task::spawn_blocking(move || {
            let read_value_id = ReadValueId {
                node_id,
                attribute_id: AttributeId::Value as u32,
                index_range: UAString::null(),
                data_encoding: QualifiedName::null(),
            };

            let results = session
                .read()
                .read(&[read_value_id], TimestampsToReturn::Both, 0.0)
                .map_err(|status| {
                    OpcUaError::from(OperationError::read_failed(
                        node_ref.as_str(),
                        format!("Read failed: {}", status),
                    ))
                })?;

            let data_value = results.into_iter().next().ok_or_else(|| {
                OpcUaError::from(OperationError::read_failed(node_ref.as_str(), "empty response"))
            })?;

            if let Some(status) = data_value.status {
                if status.is_bad() {
                    return Err(OperationError::bad_status(node_ref.as_str(), status.bits()).into());
                }
            }

            Ok(data_value
                .value
                .as_ref()
                .map(Self::from_opcua_variant)
                .unwrap_or(OpcUaValue::Null))
        })
        .await
        .map_err(|e| join_error_on_operation(e, node, "read"))?
    }

    async fn write_value(&self, node: &NodeRef, value: OpcUaValue) -> OpcUaResult<()> {
        let node_id = Self::parse_node_id(node, "write")?;
        let variant = Self::to_opcua_variant(&value)?;
        let session = Arc::clone(&self.session);
        let node_ref = node.clone();

        trace!(node_id = %node, value = %value, "Writing node value");

        tokio::task::spawn_blocking(move || {
            let write_value = WriteValue {
                node_id,
                attribute_id: AttributeId::Value as u32,
                index_range: UAString::null(),
                value: DataValue::new_now(variant),
            };

            let results = session.read().write(&[write_value]).map_err(|status| {
                OpcUaError::from(OperationError::write_failed(
                    node_ref.as_str(),
                    format!("Write failed: {}", status),
                ))
            })?;

            match results.first() {
                Some(status) if status.is_good() => Ok(()),
                Some(status) => Err(OperationError::bad_status(node_ref.as_str(), status.bits()).into()),
                None => Err(OperationError::write_failed(node_ref.as_str(), "empty response").into()),
            }
        })
        .await
        .map_err(|e| join_error_on_operation(e, node, "write"))?
    }

    async fn disconnect(&self) -> OpcUaResult<()> {
        let session = Arc::clone(&self.session);
        debug!(endpoint = %self.endpoint, "Disconnecting OPC UA session");

        tokio::task::spawn_blocking(move || session.read().disconnect())
            .await
            .map_err(|e| ConnectionError::refused(&self.endpoint, format!("disconnect failed: {}", e)))?;

        info!(endpoint = %self.endpoint, "Disconnected from OPC UA server");
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

// =============================================================================
// Tests
// =============================================================================
