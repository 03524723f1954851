// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Session Lifecycle Integration Tests
//!
//! - `test_connect_*`: connect serialization and idempotence
//! - `test_rebind_*`: endpoint changes
//! - `test_failure_*`: invalidation after protocol failures
//! - `test_write_*`: value coercion through a live session

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::task::JoinSet;

use uadash_config::{FileConfigStore, StaticEndpoint};
use uadash_opcua::{NodeRef, OpcUaError, SessionManager, SessionPolicy, SessionState};
use uadash_tests::prelude::*;

// =============================================================================
// Test Helpers
// =============================================================================

fn manager(endpoint: Option<&str>) -> (Arc<MockConnector>, Arc<StaticEndpoint>, Arc<SessionManager>) {
    init_test_logging();
    let connector = Arc::new(MockConnector::new());
    let endpoints = Arc::new(StaticEndpoint::new(endpoint));
    let session = Arc::new(SessionManager::new(connector.clone(), endpoints.clone()));
    (connector, endpoints, session)
}

// =============================================================================
// Connect
// =============================================================================

#[tokio::test]
async fn test_connect_concurrent_callers_share_one_attempt() {
    let (connector, _, session) = manager(Some(PLANT_ENDPOINT));
    connector.set_connect_latency(Duration::from_millis(50));

    let (a, b) = tokio::join!(session.ensure_connected(), session.ensure_connected());

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(connector.connect_count(), 1);
    assert_eq!(session.state(), SessionState::Connected);
}

#[tokio::test]
async fn test_connect_many_concurrent_reads_one_connect() {
    let (connector, _, session) = manager(Some(PLANT_ENDPOINT));
    connector.set_connect_latency(Duration::from_millis(20));
    connector.set_value(TANK_LEVEL, OpcUaValue::Double(42.5));

    let mut tasks = JoinSet::new();
    for _ in 0..16 {
        let session = session.clone();
        tasks.spawn(async move { session.read(&NodeRef::new(TANK_LEVEL)).await });
    }

    while let Some(joined) = tasks.join_next().await {
        assert_eq!(joined.unwrap().unwrap(), "42.5");
    }
    assert_eq!(connector.connect_count(), 1);
}

#[tokio::test]
async fn test_connect_is_idempotent() {
    let (connector, _, session) = manager(Some(PLANT_ENDPOINT));

    for _ in 0..5 {
        session.ensure_connected().await.unwrap();
    }

    assert_eq!(connector.connect_count(), 1);
    assert_eq!(session.bound_endpoint().as_deref(), Some(PLANT_ENDPOINT));
}

#[tokio::test]
async fn test_connect_without_endpoint_never_dials() {
    let (connector, _, session) = manager(None);

    let err = session.ensure_connected().await.unwrap_err();

    assert!(matches!(err, OpcUaError::Configuration(_)));
    assert!(err.is_unavailable());
    assert_eq!(connector.connect_count(), 0);
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn test_connect_failure_then_recovery() {
    let (connector, _, session) = manager(Some(PLANT_ENDPOINT));
    connector.fail_connect(true);

    let err = session.ensure_connected().await.unwrap_err();
    assert!(matches!(err, OpcUaError::Connection(_)));
    assert_eq!(session.state(), SessionState::Disconnected);

    connector.fail_connect(false);
    session.ensure_connected().await.unwrap();

    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(connector.connect_count(), 2);
    assert_eq!(session.status().await.stats.connect_failures, 1);
}

#[tokio::test]
async fn test_connect_cancelled_leaves_disconnected() {
    let (connector, _, session) = manager(Some(PLANT_ENDPOINT));
    connector.set_connect_latency(Duration::from_millis(500));

    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.ensure_connected().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.state(), SessionState::Connecting);

    pending.abort();
    let _ = pending.await;
    assert_eq!(session.state(), SessionState::Disconnected);

    connector.set_connect_latency(Duration::ZERO);
    session.ensure_connected().await.unwrap();
    assert_eq!(session.state(), SessionState::Connected);
}

// =============================================================================
// Rebind
// =============================================================================

#[tokio::test]
async fn test_rebind_on_endpoint_change() {
    let (connector, endpoints, session) = manager(Some(PLANT_ENDPOINT));

    session.ensure_connected().await.unwrap();
    endpoints.set(Some(BACKUP_ENDPOINT));
    session.ensure_connected().await.unwrap();

    assert_eq!(
        connector.connected_endpoints(),
        vec![PLANT_ENDPOINT.to_string(), BACKUP_ENDPOINT.to_string()]
    );
    assert_eq!(connector.disconnect_count(), 1);
    assert_eq!(session.bound_endpoint().as_deref(), Some(BACKUP_ENDPOINT));
}

#[tokio::test]
async fn test_rebind_follows_dashboard_document() {
    init_test_logging();
    let dir = temp_test_dir("uadash-rebind");
    let store = Arc::new(FileConfigStore::open(dir.path().join("config.json")).unwrap());
    store
        .save(&DashboardFixtures::with_endpoint(PLANT_ENDPOINT))
        .unwrap();

    let connector = Arc::new(MockConnector::new());
    let session = SessionManager::new(connector.clone(), store.clone());
    session.ensure_connected().await.unwrap();

    store
        .update(|doc| {
            doc.opcua_endpoint = BACKUP_ENDPOINT.to_string();
            Some(())
        })
        .unwrap();
    session.ensure_connected().await.unwrap();

    assert_eq!(session.bound_endpoint().as_deref(), Some(BACKUP_ENDPOINT));
    assert_eq!(connector.connect_count(), 2);
}

#[tokio::test]
async fn test_rebind_cleared_endpoint_drops_session() {
    let (connector, endpoints, session) = manager(Some(PLANT_ENDPOINT));
    session.ensure_connected().await.unwrap();

    endpoints.set(None);
    let err = session.ensure_connected().await.unwrap_err();

    assert!(matches!(err, OpcUaError::Configuration(_)));
    assert_eq!(connector.disconnect_count(), 1);
    assert_eq!(session.state(), SessionState::Disconnected);
}

// =============================================================================
// Failure handling
// =============================================================================

#[tokio::test]
async fn test_failure_read_invalidates_and_next_read_reconnects() {
    let (connector, _, session) = manager(Some(PLANT_ENDPOINT));
    connector.set_value(TANK_LEVEL, OpcUaValue::Int32(7));

    connector.fail_reads(true);
    let err = session.read(&NodeRef::new(TANK_LEVEL)).await.unwrap_err();
    assert!(matches!(err, OpcUaError::Operation(_)));
    assert_eq!(err.node_id(), Some(TANK_LEVEL));
    assert_eq!(session.state(), SessionState::Disconnected);

    connector.fail_reads(false);
    assert_eq!(session.read(&NodeRef::new(TANK_LEVEL)).await.unwrap(), "7");
    assert_eq!(connector.connect_count(), 2);
}

#[tokio::test]
async fn test_failure_unknown_node_invalidates() {
    let (connector, _, session) = manager(Some(PLANT_ENDPOINT));

    let err = session.read(&NodeRef::new("ns=2;s=Missing")).await.unwrap_err();

    assert!(matches!(err, OpcUaError::Operation(_)));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert_eq!(connector.disconnect_count(), 1);
}

#[tokio::test]
async fn test_failure_disconnect_error_is_swallowed() {
    let (connector, _, session) = manager(Some(PLANT_ENDPOINT));
    session.ensure_connected().await.unwrap();
    connector.fail_disconnect(true);

    session.invalidate().await;

    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(session.bound_endpoint().is_none());
}

#[tokio::test]
async fn test_failure_invalidate_when_idle_is_noop() {
    let (connector, _, session) = manager(Some(PLANT_ENDPOINT));

    session.invalidate().await;
    session.invalidate().await;

    assert_eq!(session.state(), SessionState::Disconnected);
    assert_eq!(connector.disconnect_count(), 0);
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn test_write_coerces_to_observed_type() {
    let (connector, _, session) = manager(Some(PLANT_ENDPOINT));
    connector.set_value(SETPOINT, OpcUaValue::Int32(0));

    let written = session
        .write(&NodeRef::new(SETPOINT), &json!("42"), None)
        .await
        .unwrap();

    assert_eq!(written, OpcUaValue::Int32(42));
    assert_eq!(connector.value(SETPOINT), Some(OpcUaValue::Int32(42)));
}

#[tokio::test]
async fn test_write_switch_hint_forces_boolean() {
    let (connector, _, session) = manager(Some(PLANT_ENDPOINT));
    connector.set_value(PUMP_RUN, OpcUaValue::Double(1.0));

    let written = session
        .write(&NodeRef::new(PUMP_RUN), &json!(0), Some("switch"))
        .await
        .unwrap();

    assert_eq!(written, OpcUaValue::Boolean(false));
    assert_eq!(
        connector.write_history(),
        vec![(PUMP_RUN.to_string(), OpcUaValue::Boolean(false))]
    );
}

#[tokio::test]
async fn test_write_conversion_error_invalidates_by_default() {
    let (connector, _, session) = manager(Some(PLANT_ENDPOINT));
    connector.set_value(SETPOINT, OpcUaValue::Int32(0));

    let err = session
        .write(&NodeRef::new(SETPOINT), &json!("abc"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, OpcUaError::Conversion(_)));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(connector.write_history().is_empty());
}

#[tokio::test]
async fn test_write_conversion_error_keeps_session_when_configured() {
    init_test_logging();
    let connector = Arc::new(MockConnector::new());
    connector.set_value(SETPOINT, OpcUaValue::Int32(0));
    let session = SessionManager::new(
        connector.clone(),
        Arc::new(StaticEndpoint::new(Some(PLANT_ENDPOINT))),
    )
    .with_policy(SessionPolicy {
        invalidate_on_conversion_error: false,
    });

    let err = session
        .write(&NodeRef::new(SETPOINT), &json!(1.5), None)
        .await
        .unwrap_err();

    assert!(matches!(err, OpcUaError::Conversion(_)));
    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(connector.connect_count(), 1);
}

#[tokio::test]
async fn test_write_failure_invalidates() {
    let (connector, _, session) = manager(Some(PLANT_ENDPOINT));
    connector.set_value(SETPOINT, OpcUaValue::Double(0.0));
    connector.fail_writes(true);

    let err = session
        .write(&NodeRef::new(SETPOINT), &json!(3.5), None)
        .await
        .unwrap_err();

    assert!(matches!(err, OpcUaError::Operation(_)));
    assert_eq!(session.state(), SessionState::Disconnected);
}
