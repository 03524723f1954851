// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Historical Query Integration Tests
//!
//! Runs the query engine over a JSON-lines log on disk, the way the API
//! handler does.

use std::io::Write;

use uadash_history::{
    parse_bound, parse_timestamp, query, HistoricalSample, JsonLinesLog, SampleLog,
};
use uadash_tests::prelude::*;

const WIDGET: &str = "widget-tank";

fn timestamps(samples: &[HistoricalSample]) -> Vec<&str> {
    samples.iter().map(|s| s.timestamp.as_str()).collect()
}

// =============================================================================
// Query over fixtures
// =============================================================================

#[test]
fn test_query_unbounded_returns_sorted_valid_samples() {
    init_test_logging();
    let samples = HistoryFixtures::tank_level_day(WIDGET);

    let hits = query(&samples, WIDGET, None, None);

    assert_eq!(
        timestamps(&hits),
        vec![
            "2024-03-01T08:00:00Z",
            "2024-03-01T09:00:00Z",
            "2024-03-01T10:00:00Z",
            "2024-03-01T11:00:00Z",
            "2024-03-01T12:00:00Z",
        ]
    );
}

#[test]
fn test_query_window_bounds_are_inclusive() {
    let samples = HistoryFixtures::tank_level_day(WIDGET);
    let start = parse_bound("start_time", Some("2024-03-01T09:00:00")).unwrap();
    let end = parse_bound("end_time", Some("2024-03-01T11:00:00")).unwrap();

    let hits = query(&samples, WIDGET, start, end);

    let values: Vec<&str> = hits.iter().map(|s| s.value.as_str()).collect();
    assert_eq!(values, vec!["51.0", "52.5", "54.0"]);
}

#[test]
fn test_query_date_only_bounds_from_browser() {
    let samples = HistoryFixtures::three_days(WIDGET);
    let start = parse_bound("start_time", Some("2024-03-02T00:00:00")).unwrap();
    let end = parse_bound("end_time", Some("2024-03-03T00:00:00")).unwrap();

    let hits = query(&samples, WIDGET, start, end);

    assert_eq!(timestamps(&hits), vec!["2024-03-02T12:00:00Z"]);
}

#[test]
fn test_query_open_ended_window() {
    let samples = HistoryFixtures::three_days(WIDGET);
    let start = parse_bound("start_time", Some("2024-03-02")).unwrap();

    let hits = query(&samples, WIDGET, start, None);

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].value, "1");
}

#[test]
fn test_query_other_node_isolated() {
    let samples = HistoryFixtures::tank_level_day(WIDGET);

    let hits = query(&samples, "other-widget", None, None);

    assert_eq!(hits.len(), 1);
    assert!(query(&samples, "widget", None, None).is_empty());
}

#[test]
fn test_query_mixed_timestamp_styles_sort_by_instant() {
    let samples = vec![
        HistoricalSample::new(WIDGET, "2024-03-01 10:00:00+02:00", "b"),
        HistoricalSample::new(WIDGET, "2024-03-01T07:30:00Z", "a"),
        HistoricalSample::new(WIDGET, "2024-03-01T09:00:00.250", "c"),
    ];

    let hits = query(&samples, WIDGET, None, None);

    let values: Vec<&str> = hits.iter().map(|s| s.value.as_str()).collect();
    assert_eq!(values, vec!["a", "b", "c"]);
    assert_eq!(
        parse_timestamp("2024-03-01 10:00:00+02:00").unwrap(),
        parse_timestamp("2024-03-01T08:00:00Z").unwrap()
    );
}

#[test]
fn test_query_malformed_bound_rejected() {
    let err = parse_bound("end_time", Some("yesterday")).unwrap_err();
    assert!(err.is_client_error());
    assert!(err.to_string().contains("end_time"));
}

// =============================================================================
// JSON-lines log
// =============================================================================

#[tokio::test]
async fn test_log_append_then_query() {
    init_test_logging();
    let dir = temp_test_dir("uadash-history");
    let log = JsonLinesLog::new(dir.path().join("history.jsonl"));

    for sample in HistoryFixtures::tank_level_day(WIDGET) {
        log.append(sample).await.unwrap();
    }

    let loaded = log.load_all().await.unwrap();
    assert_eq!(loaded.len(), 7);

    let hits = query(&loaded, WIDGET, None, None);
    assert_eq!(hits.len(), 5);
    assert_eq!(hits[0].value, "50.0");
}

#[tokio::test]
async fn test_log_skips_corrupt_lines_and_accepts_numeric_values() {
    let dir = temp_test_dir("uadash-history");
    let path = dir.path().join("history.jsonl");
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"node_id":"{}","timestamp":"2024-03-01T08:00:00Z","value":50}}"#, WIDGET).unwrap();
        writeln!(file, "{{truncated").unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"node_id":"{}","timestamp":"2024-03-01T09:00:00Z","value":true}}"#, WIDGET).unwrap();
    }

    let log = JsonLinesLog::new(&path);
    let loaded = log.load_all().await.unwrap();

    let values: Vec<&str> = loaded.iter().map(|s| s.value.as_str()).collect();
    assert_eq!(values, vec!["50", "true"]);
}

#[tokio::test]
async fn test_log_missing_file_is_empty() {
    let dir = temp_test_dir("uadash-history");
    let log = JsonLinesLog::new(dir.path().join("never-written.jsonl"));

    assert!(log.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_log_concurrent_appends_keep_every_line() {
    let dir = temp_test_dir("uadash-history");
    let log = std::sync::Arc::new(JsonLinesLog::new(dir.path().join("history.jsonl")));

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..20 {
        let log = log.clone();
        tasks.spawn(async move {
            log.append(HistoricalSample::now(WIDGET, i.to_string())).await
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    assert_eq!(log.load_all().await.unwrap().len(), 20);
}
