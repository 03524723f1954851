// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! A scripted OPC UA server: [`MockConnector`] hands out [`MockTransport`]
//! sessions that share one value table, so values survive reconnects the
//! way they would on a real server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use uadash_opcua::{
    ConnectionError, NodeRef, OpcUaConnector, OpcUaResult, OpcUaTransport, OpcUaValue,
    OperationError,
};

type ValueTable = Arc<RwLock<HashMap<String, OpcUaValue>>>;

// =============================================================================
// Failure switches
// =============================================================================

/// Error injection shared by the connector and every session it opens.
#[derive(Debug, Default)]
pub struct FailureSwitches {
    /// Fail every connect attempt.
    pub fail_connect: AtomicBool,
    /// Fail every read.
    pub fail_reads: AtomicBool,
    /// Fail every write.
    pub fail_writes: AtomicBool,
    /// Fail disconnects (the manager must swallow these).
    pub fail_disconnect: AtomicBool,
}

/// Interaction counters.
#[derive(Debug, Default)]
pub struct CallCounters {
    /// Connect calls.
    pub connects: AtomicU64,
    /// Read calls across all sessions.
    pub reads: AtomicU64,
    /// Write calls across all sessions.
    pub writes: AtomicU64,
    /// Disconnect calls across all sessions.
    pub disconnects: AtomicU64,
}

// =============================================================================
// MockConnector
// =============================================================================

/// Configurable connector for session and API tests.
pub struct MockConnector {
    values: ValueTable,
    /// Error injection.
    pub failures: Arc<FailureSwitches>,
    /// Interaction counters.
    pub counters: Arc<CallCounters>,
    connect_latency: Mutex<Duration>,
    connected_endpoints: Mutex<Vec<String>>,
    writes: Arc<Mutex<Vec<(String, OpcUaValue)>>>,
}

impl MockConnector {
    /// Creates a connector whose server has no nodes.
    pub fn new() -> Self {
        Self {
            values: Arc::new(RwLock::new(HashMap::new())),
            failures: Arc::new(FailureSwitches::default()),
            counters: Arc::new(CallCounters::default()),
            connect_latency: Mutex::new(Duration::ZERO),
            connected_endpoints: Mutex::new(Vec::new()),
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sets the value of a node on the simulated server.
    pub fn set_value(&self, node_id: impl Into<String>, value: OpcUaValue) {
        self.values.write().insert(node_id.into(), value);
    }

    /// Returns the current value of a node on the simulated server.
    pub fn value(&self, node_id: &str) -> Option<OpcUaValue> {
        self.values.read().get(node_id).cloned()
    }

    /// Delays every connect attempt.
    pub fn set_connect_latency(&self, latency: Duration) {
        *self.connect_latency.lock() = latency;
    }

    /// Makes every connect attempt fail.
    pub fn fail_connect(&self, fail: bool) {
        self.failures.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Makes every read fail.
    pub fn fail_reads(&self, fail: bool) {
        self.failures.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every write fail.
    pub fn fail_writes(&self, fail: bool) {
        self.failures.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every disconnect fail.
    pub fn fail_disconnect(&self, fail: bool) {
        self.failures.fail_disconnect.store(fail, Ordering::SeqCst);
    }

    /// Number of connect calls.
    pub fn connect_count(&self) -> u64 {
        self.counters.connects.load(Ordering::SeqCst)
    }

    /// Number of disconnect calls.
    pub fn disconnect_count(&self) -> u64 {
        self.counters.disconnects.load(Ordering::SeqCst)
    }

    /// Number of read calls, including the read-back before each write.
    pub fn read_count(&self) -> u64 {
        self.counters.reads.load(Ordering::SeqCst)
    }

    /// Endpoints passed to successful connects, in order.
    pub fn connected_endpoints(&self) -> Vec<String> {
        self.connected_endpoints.lock().clone()
    }

    /// Values written so far, in order.
    pub fn write_history(&self) -> Vec<(String, OpcUaValue)> {
        self.writes.lock().clone()
    }
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OpcUaConnector for MockConnector {
    async fn connect(&self, endpoint: &str) -> OpcUaResult<Arc<dyn OpcUaTransport>> {
        self.counters.connects.fetch_add(1, Ordering::SeqCst);

        let latency = *self.connect_latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.failures.fail_connect.load(Ordering::SeqCst) {
            return Err(ConnectionError::refused(endpoint, "connection refused").into());
        }

        self.connected_endpoints.lock().push(endpoint.to_string());

        Ok(Arc::new(MockTransport {
            endpoint: endpoint.to_string(),
            values: Arc::clone(&self.values),
            failures: Arc::clone(&self.failures),
            counters: Arc::clone(&self.counters),
            writes: Arc::clone(&self.writes),
        }))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// =============================================================================
// MockTransport
// =============================================================================

/// One session on the simulated server.
pub struct MockTransport {
    endpoint: String,
    values: ValueTable,
    failures: Arc<FailureSwitches>,
    counters: Arc<CallCounters>,
    writes: Arc<Mutex<Vec<(String, OpcUaValue)>>>,
}

#[async_trait]
impl OpcUaTransport for MockTransport {
    async fn read_value(&self, node: &NodeRef) -> OpcUaResult<OpcUaValue> {
        self.counters.reads.fetch_add(1, Ordering::SeqCst);

        if self.failures.fail_reads.load(Ordering::SeqCst) {
            return Err(OperationError::read_failed(node.as_str(), "BadCommunicationError").into());
        }

        self.values
            .read()
            .get(node.as_str())
            .cloned()
            .ok_or_else(|| OperationError::read_failed(node.as_str(), "BadNodeIdUnknown").into())
    }

    async fn write_value(&self, node: &NodeRef, value: OpcUaValue) -> OpcUaResult<()> {
        self.counters.writes.fetch_add(1, Ordering::SeqCst);

        if self.failures.fail_writes.load(Ordering::SeqCst) {
            return Err(OperationError::write_failed(node.as_str(), "BadNotWritable").into());
        }

        self.values
            .write()
            .insert(node.as_str().to_string(), value.clone());
        self.writes.lock().push((node.as_str().to_string(), value));
        Ok(())
    }

    async fn disconnect(&self) -> OpcUaResult<()> {
        self.counters.disconnects.fetch_add(1, Ordering::SeqCst);

        if self.failures.fail_disconnect.load(Ordering::SeqCst) {
            return Err(ConnectionError::refused(&self.endpoint, "socket already closed").into());
        }
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
