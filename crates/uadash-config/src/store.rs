// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Dashboard document store.
//!
//! The dashboard document (`config.json`) holds everything the operator edits
//! from the browser:
//!
//! ```json
//! {
//!   "opcua_endpoint": "opc.tcp://plc.local:4840",
//!   "nodes":  [{ "id": "...", "name": "Tank level", "node_ua_id": "ns=2;s=Tank.Level",
//!                "type": "gauge", "size": "small", "groupId": null }],
//!   "groups": [{ "id": "...", "title": "Tank farm", "size": "large" }],
//!   "layout": {},
//!   "scada_layout": {}
//! }
//! ```
//!
//! [`FileConfigStore`] reads and parses the file on every call, so edits made
//! outside the process are visible to the next request. The last document
//! that parsed is kept only as a fallback endpoint while the file is
//! unreadable. Saves go through a temporary file in the same directory and an
//! atomic rename.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, trace, warn};

use crate::endpoint::{EndpointConfig, EndpointSource};
use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Document Types
// =============================================================================

/// The persisted dashboard document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Configured OPC UA endpoint URL; empty when unset.
    #[serde(default)]
    pub opcua_endpoint: String,

    /// Tag widgets.
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,

    /// Widget groups.
    #[serde(default)]
    pub groups: Vec<GroupRecord>,

    /// Dashboard layout, keyed by node or group id.
    #[serde(default = "empty_object")]
    pub layout: Value,

    /// SCADA view layout, keyed by node id.
    #[serde(default = "empty_object")]
    pub scada_layout: Value,

    /// Unknown top-level keys, preserved on save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            opcua_endpoint: String::new(),
            nodes: Vec::new(),
            groups: Vec::new(),
            layout: empty_object(),
            scada_layout: empty_object(),
            extra: Map::new(),
        }
    }
}

/// A tag widget bound to an OPC UA node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Widget id (UUID v4).
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// OPC UA node identifier.
    #[serde(default)]
    pub node_ua_id: String,

    /// Widget type; `"switch"` forces boolean writes.
    #[serde(rename = "type", default)]
    pub widget_type: String,

    /// Widget size, as chosen by the frontend.
    #[serde(default)]
    pub size: Value,

    /// Owning group id.
    #[serde(rename = "groupId", default)]
    pub group_id: Option<String>,

    /// Frontend-owned fields (`value`, `x`, `y`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Editable fields of a [`NodeRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFields {
    /// Display name.
    pub name: String,
    /// OPC UA node identifier.
    pub node_ua_id: String,
    /// Widget type.
    pub widget_type: String,
    /// Widget size.
    pub size: Value,
    /// Owning group id.
    pub group_id: Option<String>,
}

impl NodeRecord {
    fn create(fields: NodeFields) -> Self {
        let mut extra = Map::new();
        extra.insert("value".to_string(), Value::Null);
        extra.insert("x".to_string(), Value::from(0));
        extra.insert("y".to_string(), Value::from(0));

        let mut record = Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: String::new(),
            node_ua_id: String::new(),
            widget_type: String::new(),
            size: Value::Null,
            group_id: None,
            extra,
        };
        record.apply(fields);
        record
    }

    fn apply(&mut self, fields: NodeFields) {
        self.name = fields.name;
        self.node_ua_id = fields.node_ua_id;
        self.widget_type = fields.widget_type;
        self.size = fields.size;
        self.group_id = fields.group_id;
    }
}

/// A widget group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    /// Group id (UUID v4).
    pub id: String,

    /// Group title.
    #[serde(default)]
    pub title: String,

    /// Group size.
    #[serde(default)]
    pub size: Value,

    /// Frontend-owned fields (`x`, `y`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DashboardConfig {
    /// Returns the configured endpoint, if any.
    pub fn endpoint(&self) -> Option<EndpointConfig> {
        EndpointConfig::from_optional(Some(&self.opcua_endpoint))
    }

    /// Finds a node by widget id.
    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Finds the first node bound to an OPC UA node identifier.
    pub fn node_by_ua_id(&self, node_ua_id: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.node_ua_id == node_ua_id)
    }

    /// Appends a new node with a fresh id.
    pub fn add_node(&mut self, fields: NodeFields) -> NodeRecord {
        let record = NodeRecord::create(fields);
        self.nodes.push(record.clone());
        record
    }

    /// Updates an existing node. Returns `None` if `id` is unknown.
    pub fn update_node(&mut self, id: &str, fields: NodeFields) -> Option<NodeRecord> {
        let node = self.nodes.iter_mut().find(|n| n.id == id)?;
        node.apply(fields);
        Some(node.clone())
    }

    /// Removes a node and its layout entries. Returns `false` if unknown.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return false;
        }
        remove_key(&mut self.layout, id);
        remove_key(&mut self.scada_layout, id);
        true
    }

    /// Appends a new group with a fresh id.
    pub fn add_group(&mut self, title: String, size: Value) -> GroupRecord {
        let mut extra = Map::new();
        extra.insert("x".to_string(), Value::from(0));
        extra.insert("y".to_string(), Value::from(0));

        let record = GroupRecord {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            size,
            extra,
        };
        self.groups.push(record.clone());
        record
    }

    /// Updates an existing group. Returns `None` if `id` is unknown.
    pub fn update_group(&mut self, id: &str, title: String, size: Value) -> Option<GroupRecord> {
        let group = self.groups.iter_mut().find(|g| g.id == id)?;
        group.title = title;
        group.size = size;
        Some(group.clone())
    }

    /// Removes a group, detaching its member nodes. Returns `false` if unknown.
    pub fn remove_group(&mut self, id: &str) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != id);
        if self.groups.len() == before {
            return false;
        }
        for node in &mut self.nodes {
            if node.group_id.as_deref() == Some(id) {
                node.group_id = None;
            }
        }
        remove_key(&mut self.layout, id);
        true
    }
}

fn remove_key(layout: &mut Value, key: &str) {
    if let Value::Object(map) = layout {
        map.remove(key);
    }
}

// =============================================================================
// FileConfigStore
// =============================================================================

/// JSON file backed dashboard store.
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    /// Last document that parsed. Never served while the file is readable.
    last_good: RwLock<Option<DashboardConfig>>,
    /// Serializes load-modify-save cycles.
    write_lock: Mutex<()>,
}

impl FileConfigStore {
    /// Opens the store, creating an empty document if the file is missing.
    pub fn open(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let store = Self {
            path: path.into(),
            last_good: RwLock::new(None),
            write_lock: Mutex::new(()),
        };

        if !store.path.exists() {
            info!(path = %store.path.display(), "Creating default dashboard document");
            store.save(&DashboardConfig::default())?;
        }

        store.load()?;
        Ok(store)
    }

    /// Returns the document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the document from disk.
    pub fn load(&self) -> ConfigResult<DashboardConfig> {
        let content = fs::read_to_string(&self.path).map_err(|e| ConfigError::io(&self.path, e))?;
        self.parse(&content)
    }

    /// Same as [`load`](Self::load), reading the file on tokio's blocking pool.
    pub async fn load_async(&self) -> ConfigResult<DashboardConfig> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ConfigError::io(&self.path, e))?;
        self.parse(&content)
    }

    fn parse(&self, content: &str) -> ConfigResult<DashboardConfig> {
        let doc: DashboardConfig = serde_json::from_str(content)
            .map_err(|e| ConfigError::parse(&self.path, e.to_string()))?;

        trace!(
            path = %self.path.display(),
            nodes = doc.nodes.len(),
            groups = doc.groups.len(),
            "Dashboard document loaded"
        );

        *self.last_good.write() = Some(doc.clone());
        Ok(doc)
    }

    /// Atomically replaces the document on disk.
    pub fn save(&self, doc: &DashboardConfig) -> ConfigResult<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| ConfigError::io(&dir, e))?;
        serde_json::to_writer_pretty(&mut tmp, doc)
            .map_err(|e| ConfigError::serialization(e.to_string()))?;
        tmp.write_all(b"\n")
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| ConfigError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| ConfigError::io(&self.path, e.error))?;

        *self.last_good.write() = Some(doc.clone());

        debug!(path = %self.path.display(), "Dashboard document saved");
        Ok(())
    }

    /// Loads, mutates and saves the document under the store's write lock.
    ///
    /// The document is saved only when `f` returns `Some`.
    pub fn update<R>(
        &self,
        f: impl FnOnce(&mut DashboardConfig) -> Option<R>,
    ) -> ConfigResult<Option<R>> {
        let _guard = self.write_lock.lock();

        let mut doc = self.load()?;
        let result = f(&mut doc);
        if result.is_some() {
            self.save(&doc)?;
        }
        Ok(result)
    }
}

#[async_trait]
impl EndpointSource for FileConfigStore {
    async fn current_endpoint(&self) -> Option<EndpointConfig> {
        match self.load_async().await {
            Ok(doc) => doc.endpoint(),
            Err(e) => {
                warn!(error = %e, "Failed to read dashboard document; using last known endpoint");
                self.last_good.read().as_ref().and_then(DashboardConfig::endpoint)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
