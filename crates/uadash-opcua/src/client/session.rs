// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA session lifecycle management.
//!
//! The [`SessionManager`] owns at most one live session to the configured
//! endpoint. Every read and write first calls [`SessionManager::ensure_connected`],
//! which reuses the bound session when the configured URL is unchanged and
//! otherwise tears the stale one down and opens a new one.
//!
//! # State Machine
//!
//! ```text
//!                 ensure_connected()
//!  Disconnected ─────────────────────► Connecting
//!       ▲                                  │
//!       │  failure / cancellation          │ success
//!       ├──────────────────────────────────┘
//!       │                                  ▼
//!       └──────────────────────────────  Connected
//!          invalidate() / URL changed
//! ```
//!
//! Transitions happen inside one async mutex, so concurrent callers on an
//! empty session produce a single connect. Established sessions are shared:
//! reads and writes clone the transport handle and run without the lock.
//!
//! Any protocol error on a read or write invalidates the session, and so does
//! dropping a read or write future before it completes. Nothing is retried
//! internally; the next request reconnects.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use uadash_config::EndpointSource;

use crate::error::{OpcUaError, OpcUaResult, OperationError};
use crate::types::{NodeRef, SessionPolicy, SessionState};

use super::coercion::{coerce_for_write, normalize_read};
use super::transport::{OpcUaConnector, OpcUaTransport, OpcUaValue};

// =============================================================================
// SessionSlot
// =============================================================================

/// The single mutable session slot.
#[derive(Default)]
struct SessionSlot {
    state: SessionState,
    bound_endpoint: Option<String>,
    handle: Option<Arc<dyn OpcUaTransport>>,
    /// Bumped on every successful connect.
    generation: u64,
}

impl SessionSlot {
    /// Resets to `Disconnected`, returning the handle that was held.
    fn clear(&mut self) -> Option<Arc<dyn OpcUaTransport>> {
        self.state = SessionState::Disconnected;
        self.bound_endpoint = None;
        self.handle.take()
    }

    fn active_for(&self, url: &str) -> Option<ActiveSession> {
        match (&self.handle, &self.bound_endpoint) {
            (Some(handle), Some(bound)) if self.state.is_connected() && bound == url => {
                Some(ActiveSession {
                    handle: Arc::clone(handle),
                    generation: self.generation,
                })
            }
            _ => None,
        }
    }
}

/// A transport handle cloned out of the slot.
struct ActiveSession {
    handle: Arc<dyn OpcUaTransport>,
    generation: u64,
}

/// Resets the slot to `Disconnected` and counts a failed connect unless
/// disarmed.
///
/// Held across the connect await so a dropped caller cannot leave the slot
/// in `Connecting`.
struct ConnectingGuard<'a> {
    slot: &'a RwLock<SessionSlot>,
    stats: &'a SessionStats,
    armed: bool,
}

impl ConnectingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.slot.write().clear();
            self.stats.record_connect_failure();
            tracing::debug!("OPC UA connect attempt did not complete");
        }
    }
}

/// Invalidates the session if a read or write is dropped mid-flight.
struct OperationGuard<'a> {
    manager: &'a SessionManager,
    generation: u64,
    armed: bool,
}

impl OperationGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.manager.abandon_generation(self.generation);
        }
    }
}

// =============================================================================
// SessionManager
// =============================================================================

/// Owns the single outbound OPC UA session.
pub struct SessionManager {
    /// Opens new sessions.
    connector: Arc<dyn OpcUaConnector>,

    /// Current configured endpoint.
    endpoints: Arc<dyn EndpointSource>,

    /// Serializes every state transition.
    transition: Mutex<()>,

    /// Session slot; only held for short synchronous sections.
    slot: RwLock<SessionSlot>,

    /// Failure-recovery switches.
    policy: SessionPolicy,

    /// Session statistics.
    stats: SessionStats,
}

impl SessionManager {
    /// Creates a session manager with the default policy.
    pub fn new(connector: Arc<dyn OpcUaConnector>, endpoints: Arc<dyn EndpointSource>) -> Self {
        Self {
            connector,
            endpoints,
            transition: Mutex::new(()),
            slot: RwLock::new(SessionSlot::default()),
            policy: SessionPolicy::default(),
            stats: SessionStats::new(),
        }
    }

    /// Sets the failure-recovery policy.
    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the failure-recovery policy.
    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Returns the session statistics.
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Returns the current session state.
    pub fn state(&self) -> SessionState {
        self.slot.read().state
    }

    /// Returns the endpoint URL the live session is bound to.
    pub fn bound_endpoint(&self) -> Option<String> {
        self.slot.read().bound_endpoint.clone()
    }

    /// Returns a snapshot for status reporting.
    pub async fn status(&self) -> SessionStatus {
        let (state, bound_endpoint) = {
            let slot = self.slot.read();
            (slot.state, slot.bound_endpoint.clone())
        };

        SessionStatus {
            state,
            bound_endpoint,
            configured_endpoint: self.endpoints.current_endpoint().await.map(|e| e.url),
            stats: self.stats.snapshot(),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Guarantees a session bound to the currently configured endpoint.
    ///
    /// Idempotent: when a session is already bound to the configured URL this
    /// returns without any network activity. Otherwise the stale session (if
    /// any) is torn down and exactly one connect attempt is made.
    ///
    /// # Errors
    ///
    /// - Configuration error if no endpoint is configured
    /// - Connection error if the attempt fails or is cancelled
    pub async fn ensure_connected(&self) -> OpcUaResult<()> {
        self.acquire().await.map(|_| ())
    }

    /// Tears down the session, if any.
    ///
    /// Always leaves the manager `Disconnected`. The disconnect itself is
    /// best-effort; its errors are logged and swallowed.
    pub async fn invalidate(&self) {
        let _transition = self.transition.lock().await;

        let old = self.slot.write().clear();
        self.stats.record_invalidation();

        if let Some(handle) = old {
            tracing::info!(endpoint = %handle.endpoint(), "Invalidating OPC UA session");
            disconnect_quietly(handle).await;
        }
    }

    /// Tears down the session only if it is still the one that failed.
    async fn invalidate_generation(&self, generation: u64) {
        let _transition = self.transition.lock().await;

        let old = {
            let mut slot = self.slot.write();
            if slot.generation != generation || slot.handle.is_none() {
                tracing::debug!(
                    generation,
                    current = slot.generation,
                    "Failed session already replaced; skipping invalidation"
                );
                return;
            }
            slot.clear()
        };
        self.stats.record_invalidation();

        if let Some(handle) = old {
            tracing::info!(endpoint = %handle.endpoint(), "Invalidating OPC UA session");
            disconnect_quietly(handle).await;
        }
    }

    /// Synchronous variant of [`invalidate_generation`](Self::invalidate_generation)
    /// for drop paths. The disconnect is spawned onto the current runtime.
    fn abandon_generation(&self, generation: u64) {
        let old = {
            let mut slot = self.slot.write();
            if slot.generation != generation || slot.handle.is_none() {
                return;
            }
            slot.clear()
        };
        self.stats.record_invalidation();

        if let Some(handle) = old {
            tracing::warn!(
                endpoint = %handle.endpoint(),
                "OPC UA operation cancelled; invalidating session"
            );
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                runtime.spawn(disconnect_quietly(handle));
            }
        }
    }

    fn guard(&self, generation: u64) -> OperationGuard<'_> {
        OperationGuard {
            manager: self,
            generation,
            armed: true,
        }
    }

    async fn acquire(&self) -> OpcUaResult<ActiveSession> {
        let configured = self.endpoints.current_endpoint().await;

        if let Some(endpoint) = &configured {
            if let Some(active) = self.slot.read().active_for(&endpoint.url) {
                return Ok(active);
            }
        }

        let _transition = self.transition.lock().await;

        // The configuration may have changed while waiting for the lock, and
        // another caller may already have connected.
        let configured = self.endpoints.current_endpoint().await;
        if let Some(endpoint) = &configured {
            if let Some(active) = self.slot.read().active_for(&endpoint.url) {
                return Ok(active);
            }
        }

        let stale = self.slot.write().clear();
        if let Some(handle) = stale {
            tracing::info!(
                old_endpoint = %handle.endpoint(),
                "Configured endpoint changed; closing stale OPC UA session"
            );
            self.stats.record_invalidation();
            disconnect_quietly(handle).await;
        }

        let Some(endpoint) = configured else {
            let err = OpcUaError::endpoint_missing();
            err.log("ensure_connected");
            return Err(err);
        };

        self.connect_locked(endpoint.url).await
    }

    /// Runs one connect attempt. Caller holds the transition lock.
    async fn connect_locked(&self, url: String) -> OpcUaResult<ActiveSession> {
        {
            let mut slot = self.slot.write();
            slot.state = SessionState::Connecting;
        }
        let guard = ConnectingGuard {
            slot: &self.slot,
            stats: &self.stats,
            armed: true,
        };

        self.stats.record_connect_attempt();
        tracing::info!(
            endpoint = %url,
            connector = self.connector.name(),
            "Connecting to OPC UA server"
        );

        match self.connector.connect(&url).await {
            Ok(handle) => {
                guard.disarm();
                let generation = {
                    let mut slot = self.slot.write();
                    slot.generation = slot.generation.wrapping_add(1);
                    slot.state = SessionState::Connected;
                    slot.bound_endpoint = Some(url.clone());
                    slot.handle = Some(Arc::clone(&handle));
                    slot.generation
                };
                self.stats.record_connect();
                tracing::info!(endpoint = %url, "Connected to OPC UA server");
                Ok(ActiveSession { handle, generation })
            }
            Err(err) => {
                drop(guard);
                err.log("connect");
                Err(err)
            }
        }
    }

    // =========================================================================
    // Read / Write
    // =========================================================================

    /// Reads a node and renders its value for display.
    ///
    /// # Errors
    ///
    /// - Configuration/connection error if no session can be established
    /// - Operation error if the read fails; the session is invalidated
    pub async fn read(&self, node: &NodeRef) -> OpcUaResult<String> {
        self.read_value(node).await.map(|v| normalize_read(&v))
    }

    /// Reads the raw variant of a node.
    ///
    /// Failure handling is the same as [`read`](Self::read).
    pub async fn read_value(&self, node: &NodeRef) -> OpcUaResult<OpcUaValue> {
        let session = self.acquire().await?;
        self.stats.record_read();

        let guard = self.guard(session.generation);
        let result = session.handle.read_value(node).await;
        guard.disarm();

        match result {
            Ok(value) => {
                tracing::trace!(node_id = %node, value = %value, "Read node");
                Ok(value)
            }
            Err(err) => {
                let err = as_operation_error(err, node, "read");
                self.fail_operation(&err, "read", session.generation).await;
                Err(err)
            }
        }
    }

    /// Writes a dashboard value to a node.
    ///
    /// The node is read first to learn its live data type; the value is then
    /// coerced to that type (or to a boolean for the `"switch"` hint) and
    /// written. Returns the variant that was written.
    ///
    /// # Errors
    ///
    /// - Configuration/connection error if no session can be established
    /// - Conversion error if `raw` does not fit the node's type
    /// - Operation error if the read-back or the write fails; the session is
    ///   invalidated
    pub async fn write(
        &self,
        node: &NodeRef,
        raw: &Value,
        type_hint: Option<&str>,
    ) -> OpcUaResult<OpcUaValue> {
        let session = self.acquire().await?;
        self.stats.record_write();

        let guard = self.guard(session.generation);
        let current = session.handle.read_value(node).await;
        guard.disarm();

        let current = match current {
            Ok(value) => value,
            Err(err) => {
                let err = as_operation_error(err, node, "write");
                self.fail_operation(&err, "write", session.generation).await;
                return Err(err);
            }
        };

        let variant = match coerce_for_write(raw, type_hint, current.data_type()) {
            Ok(variant) => variant,
            Err(err) => {
                err.log("write");
                if self.policy.invalidate_on_conversion_error {
                    self.invalidate_generation(session.generation).await;
                }
                return Err(err);
            }
        };

        tracing::debug!(
            node_id = %node,
            observed = %current.data_type(),
            written = %variant.data_type(),
            "Writing node"
        );

        let guard = self.guard(session.generation);
        let result = session.handle.write_value(node, variant.clone()).await;
        guard.disarm();

        match result {
            Ok(()) => Ok(variant),
            Err(err) => {
                let err = as_operation_error(err, node, "write");
                self.fail_operation(&err, "write", session.generation).await;
                Err(err)
            }
        }
    }

    async fn fail_operation(&self, err: &OpcUaError, context: &str, generation: u64) {
        self.stats.record_operation_failure();
        err.log(context);
        self.invalidate_generation(generation).await;
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.read();
        f.debug_struct("SessionManager")
            .field("connector", &self.connector.name())
            .field("state", &slot.state)
            .field("bound_endpoint", &slot.bound_endpoint)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Disconnects a released handle, logging any failure.
async fn disconnect_quietly(handle: Arc<dyn OpcUaTransport>) {
    if let Err(e) = handle.disconnect().await {
        tracing::warn!(
            endpoint = %handle.endpoint(),
            error = %e,
            "Error while disconnecting OPC UA session (ignored)"
        );
    }
}

/// Attaches the node reference to a transport failure.
fn as_operation_error(err: OpcUaError, node: &NodeRef, operation: &str) -> OpcUaError {
    match err {
        OpcUaError::Operation(_) => err,
        other if operation == "read" => {
            OperationError::read_failed(node.as_str(), other.to_string()).into()
        }
        other => OperationError::write_failed(node.as_str(), other.to_string()).into(),
    }
}

// =============================================================================
// SessionStatus
// =============================================================================

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Lifecycle state.
    pub state: SessionState,

    /// Endpoint the live session is bound to.
    pub bound_endpoint: Option<String>,

    /// Endpoint currently configured.
    pub configured_endpoint: Option<String>,

    /// Counter snapshot.
    pub stats: SessionStatsSnapshot,
}

// =============================================================================
// SessionStats
// =============================================================================

/// Statistics for session operations.
#[derive(Debug)]
pub struct SessionStats {
    /// Number of connect attempts.
    connect_attempts: AtomicU64,

    /// Number of successful connects.
    connects: AtomicU64,

    /// Number of failed or cancelled connects.
    connect_failures: AtomicU64,

    /// Number of sessions torn down.
    invalidations: AtomicU64,

    /// Number of reads issued.
    reads: AtomicU64,

    /// Number of writes issued.
    writes: AtomicU64,

    /// Number of failed reads/writes.
    operation_failures: AtomicU64,
}

impl SessionStats {
    /// Creates new session statistics.
    pub fn new() -> Self {
        Self {
            connect_attempts: AtomicU64::new(0),
            connects: AtomicU64::new(0),
            connect_failures: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            operation_failures: AtomicU64::new(0),
        }
    }

    /// Records a connect attempt.
    pub fn record_connect_attempt(&self) {
        self.connect_attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful connect.
    pub fn record_connect(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed connect.
    pub fn record_connect_failure(&self) {
        self.connect_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a session teardown.
    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a read.
    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a write.
    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed read or write.
    pub fn record_operation_failure(&self) {
        self.operation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of connect attempts.
    pub fn connect_attempts(&self) -> u64 {
        self.connect_attempts.load(Ordering::Relaxed)
    }

    /// Returns the number of successful connects.
    pub fn connects(&self) -> u64 {
        self.connects.load(Ordering::Relaxed)
    }

    /// Returns the number of failed connects.
    pub fn connect_failures(&self) -> u64 {
        self.connect_failures.load(Ordering::Relaxed)
    }

    /// Returns the number of teardowns.
    pub fn invalidations(&self) -> u64 {
        self.invalidations.load(Ordering::Relaxed)
    }

    /// Returns the number of reads.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the number of writes.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Returns the number of failed reads/writes.
    pub fn operation_failures(&self) -> u64 {
        self.operation_failures.load(Ordering::Relaxed)
    }

    /// Returns a serializable copy of all counters.
    pub fn snapshot(&self) -> SessionStatsSnapshot {
        SessionStatsSnapshot {
            connect_attempts: self.connect_attempts(),
            connects: self.connects(),
            connect_failures: self.connect_failures(),
            invalidations: self.invalidations(),
            reads: self.reads(),
            writes: self.writes(),
            operation_failures: self.operation_failures(),
        }
    }

    /// Resets all statistics.
    pub fn reset(&self) {
        self.connect_attempts.store(0, Ordering::Relaxed);
        self.connects.store(0, Ordering::Relaxed);
        self.connect_failures.store(0, Ordering::Relaxed);
        self.invalidations.store(0, Ordering::Relaxed);
        self.reads.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
        self.operation_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable copy of [`SessionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatsSnapshot {
    /// Connect attempts.
    pub connect_attempts: u64,
    /// Successful connects.
    pub connects: u64,
    /// Failed connects.
    pub connect_failures: u64,
    /// Teardowns.
    pub invalidations: u64,
    /// Reads issued.
    pub reads: u64,
    /// Writes issued.
    pub writes: u64,
    /// Failed reads/writes.
    pub operation_failures: u64,
}

// =============================================================================
// Tests
// =============================================================================
