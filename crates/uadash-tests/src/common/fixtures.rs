// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Pre-built test data.

use serde_json::json;

use uadash_config::{DashboardConfig, NodeFields};
use uadash_history::HistoricalSample;

/// Endpoint used by most tests.
pub const PLANT_ENDPOINT: &str = "opc.tcp://plant-plc:4840";

/// Secondary endpoint for rebinding tests.
pub const BACKUP_ENDPOINT: &str = "opc.tcp://backup-plc:4840";

/// Tank level node.
pub const TANK_LEVEL: &str = "ns=2;s=Tank.Level";

/// Pump run command node.
pub const PUMP_RUN: &str = "ns=2;s=Pump.Run";

/// Setpoint node.
pub const SETPOINT: &str = "ns=2;s=Loop.Setpoint";

// =============================================================================
// Dashboard fixtures
// =============================================================================

/// Dashboard documents.
pub struct DashboardFixtures;

impl DashboardFixtures {
    /// A document with only an endpoint.
    pub fn with_endpoint(url: &str) -> DashboardConfig {
        DashboardConfig {
            opcua_endpoint: url.to_string(),
            ..DashboardConfig::default()
        }
    }

    /// Widget fields for a tank level gauge.
    pub fn tank_gauge() -> NodeFields {
        NodeFields {
            name: "Tank Level".to_string(),
            node_ua_id: TANK_LEVEL.to_string(),
            widget_type: "gauge".to_string(),
            size: json!("medium"),
            group_id: None,
        }
    }

    /// Widget fields for a pump switch.
    pub fn pump_switch() -> NodeFields {
        NodeFields {
            name: "Pump".to_string(),
            node_ua_id: PUMP_RUN.to_string(),
            widget_type: "switch".to_string(),
            size: json!("small"),
            group_id: None,
        }
    }
}

// =============================================================================
// History fixtures
// =============================================================================

/// Sample series.
pub struct HistoryFixtures;

impl HistoryFixtures {
    /// Hourly tank level samples on 2024-03-01, 08:00 through 12:00, logged
    /// out of order with one malformed entry and one for another node.
    pub fn tank_level_day(node_id: &str) -> Vec<HistoricalSample> {
        vec![
            HistoricalSample::new(node_id, "2024-03-01T10:00:00Z", "52.5"),
            HistoricalSample::new(node_id, "2024-03-01T08:00:00Z", "50.0"),
            HistoricalSample::new(node_id, "not-a-time", "0"),
            HistoricalSample::new("other-widget", "2024-03-01T09:00:00Z", "1"),
            HistoricalSample::new(node_id, "2024-03-01T12:00:00Z", "55.0"),
            HistoricalSample::new(node_id, "2024-03-01T09:00:00Z", "51.0"),
            HistoricalSample::new(node_id, "2024-03-01T11:00:00Z", "54.0"),
        ]
    }

    /// Samples spanning three days at noon.
    pub fn three_days(node_id: &str) -> Vec<HistoricalSample> {
        ["2024-03-01", "2024-03-02", "2024-03-03"]
            .iter()
            .enumerate()
            .map(|(i, day)| HistoricalSample::new(node_id, format!("{}T12:00:00Z", day), i.to_string()))
            .collect()
    }
}
