// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Configuration Integration Tests
//!
//! Settings files in every supported format and the dashboard document
//! store under concurrent edits.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::thread;

use uadash_config::{
    ConfigFormat, ConfigLoader, EndpointSource, FileConfigStore, LogFormat, NodeFields,
};
use uadash_tests::prelude::*;

fn loader() -> ConfigLoader {
    ConfigLoader::new().with_env_source(HashMap::new())
}

// =============================================================================
// Settings
// =============================================================================

#[test]
fn test_settings_full_yaml() {
    let yaml = r#"
server:
  bind_address: "127.0.0.1"
  port: 8080
  request_timeout_secs: 10
  cors:
    enabled: true
    allowed_origins: ["http://localhost:3000"]
storage:
  dashboard_path: /var/lib/uadash/config.json
  history_path: /var/lib/uadash/history.jsonl
session:
  application_name: plant-dashboard
  session_timeout_ms: 30000
  invalidate_on_conversion_error: false
history:
  record_reads: true
logging:
  level: warn
  format: compact
"#;

    let settings = loader().load_from_str(yaml, ConfigFormat::Yaml).unwrap();

    assert_eq!(settings.server.socket_addr().to_string(), "127.0.0.1:8080");
    assert!(!settings.server.cors.allows_any_origin());
    assert_eq!(settings.session.application_name, "plant-dashboard");
    assert!(!settings.session.invalidate_on_conversion_error);
    assert!(settings.history.record_reads);
    assert_eq!(settings.logging.format, LogFormat::Compact);
}

#[test]
fn test_settings_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"server": {{"port": 5050}}, "history": {{"record_reads": true}}}}"#).unwrap();

    let settings = loader().load(file.path()).unwrap();

    assert_eq!(settings.server.port, 5050);
    assert!(settings.history.record_reads);
}

#[test]
fn test_settings_validation_errors() {
    for (text, field) in [
        ("session:\n  application_name: \"  \"\n", "session.application_name"),
        ("session:\n  session_timeout_ms: 0\n", "session.session_timeout_ms"),
        ("storage:\n  history_path: \"\"\n", "storage.history_path"),
    ] {
        let err = loader().load_from_str(text, ConfigFormat::Yaml).unwrap_err();
        assert!(err.is_validation_error(), "{}", text);
        assert!(err.to_string().contains(field), "{}", err);
    }
}

// =============================================================================
// Dashboard store
// =============================================================================

#[test]
fn test_store_concurrent_updates_are_not_lost() {
    init_test_logging();
    let dir = temp_test_dir("uadash-store");
    let store = Arc::new(FileConfigStore::open(dir.path().join("config.json")).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            thread::spawn(move || {
                store
                    .update(|doc| {
                        Some(doc.add_node(NodeFields {
                            name: format!("Tag {}", i),
                            node_ua_id: format!("ns=2;i={}", i),
                            widget_type: "text".to_string(),
                            size: serde_json::json!("small"),
                            group_id: None,
                        }))
                    })
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let reopened = FileConfigStore::open(dir.path().join("config.json")).unwrap();
    assert_eq!(reopened.load().unwrap().nodes.len(), 8);
}

#[tokio::test]
async fn test_store_endpoint_source_tracks_edits() {
    let dir = temp_test_dir("uadash-store");
    let path = dir.path().join("config.json");
    let store = FileConfigStore::open(&path).unwrap();
    assert!(store.current_endpoint().await.is_none());

    std::fs::write(
        &path,
        format!(r#"{{"opcua_endpoint": "{}", "nodes": [], "groups": []}}"#, PLANT_ENDPOINT),
    )
    .unwrap();

    assert_eq!(
        store.current_endpoint().await.map(|e| e.url),
        Some(PLANT_ENDPOINT.to_string())
    );
}

#[tokio::test]
async fn test_store_corrupt_file_keeps_last_endpoint() {
    let dir = temp_test_dir("uadash-store");
    let path = dir.path().join("config.json");
    let store = FileConfigStore::open(&path).unwrap();
    store
        .save(&DashboardFixtures::with_endpoint(PLANT_ENDPOINT))
        .unwrap();

    std::fs::write(&path, "{ half a document").unwrap();

    assert!(store.load().is_err());
    assert_eq!(
        store.current_endpoint().await.map(|e| e.url),
        Some(PLANT_ENDPOINT.to_string())
    );
}

#[tokio::test]
async fn test_store_same_size_rewrite_is_seen() {
    let dir = temp_test_dir("uadash-store");
    let path = dir.path().join("config.json");
    let store = FileConfigStore::open(&path).unwrap();
    store
        .save(&DashboardFixtures::with_endpoint("opc.tcp://a:4840"))
        .unwrap();
    assert_eq!(
        store.current_endpoint().await.map(|e| e.url),
        Some("opc.tcp://a:4840".to_string())
    );

    let before = std::fs::metadata(&path).unwrap();
    let rewritten = std::fs::read_to_string(&path)
        .unwrap()
        .replace("opc.tcp://a:4840", "opc.tcp://b:4840");
    std::fs::write(&path, rewritten).unwrap();
    std::fs::File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(before.modified().unwrap())
        .unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len(), before.len());

    assert_eq!(
        store.current_endpoint().await.map(|e| e.url),
        Some("opc.tcp://b:4840".to_string())
    );
}

#[test]
fn test_store_node_lifecycle_with_fixtures() {
    let dir = temp_test_dir("uadash-store");
    let store = FileConfigStore::open(dir.path().join("config.json")).unwrap();

    let gauge = store
        .update(|doc| Some(doc.add_node(DashboardFixtures::tank_gauge())))
        .unwrap()
        .unwrap();
    store
        .update(|doc| Some(doc.add_node(DashboardFixtures::pump_switch())))
        .unwrap();

    let doc = store.load().unwrap();
    assert_eq!(doc.node_by_ua_id(TANK_LEVEL).map(|n| n.id.as_str()), Some(gauge.id.as_str()));
    assert_eq!(doc.node(&gauge.id).map(|n| n.widget_type.as_str()), Some("gauge"));
    assert_eq!(doc.nodes.len(), 2);
}
