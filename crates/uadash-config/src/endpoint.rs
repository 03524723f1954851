// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Endpoint registry.
//!
//! The session manager asks an [`EndpointSource`] for the configured OPC UA
//! endpoint on every connect decision, so a new value takes effect with the
//! next request.

use std::fmt;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// The configured OPC UA endpoint. Identity is the URL string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Endpoint URL, e.g. `opc.tcp://plc.local:4840`.
    pub url: String,
}

impl EndpointConfig {
    /// Creates an endpoint from a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Returns `None` for a blank URL.
    pub fn from_optional(url: Option<&str>) -> Option<Self> {
        url.map(str::trim)
            .filter(|u| !u.is_empty())
            .map(Self::new)
    }

    /// Returns the URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Read-only view of the configured endpoint.
///
/// Implementations must not cache across calls: every call reflects the
/// latest stored value.
#[async_trait]
pub trait EndpointSource: Send + Sync {
    /// Returns the latest configured endpoint, or `None` if none is set.
    async fn current_endpoint(&self) -> Option<EndpointConfig>;
}

/// An in-memory endpoint that can be swapped at runtime.
#[derive(Debug, Default)]
pub struct StaticEndpoint {
    endpoint: RwLock<Option<EndpointConfig>>,
}

impl StaticEndpoint {
    /// Creates a source holding `url`. Blank URLs count as unset.
    pub fn new(url: Option<&str>) -> Self {
        Self {
            endpoint: RwLock::new(EndpointConfig::from_optional(url)),
        }
    }

    /// Replaces the endpoint.
    pub fn set(&self, url: Option<&str>) {
        *self.endpoint.write() = EndpointConfig::from_optional(url);
    }
}

#[async_trait]
impl EndpointSource for StaticEndpoint {
    async fn current_endpoint(&self) -> Option<EndpointConfig> {
        self.endpoint.read().clone()
    }
}
