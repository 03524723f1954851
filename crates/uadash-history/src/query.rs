// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Time-range queries over a sample log.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{HistoryError, HistoryResult};
use crate::sample::{parse_timestamp, HistoricalSample};

/// Returns the samples of `node_id` within `[start, end]`, oldest first.
///
/// Both bounds are inclusive and optional. Entries with an unparsable
/// timestamp are skipped with a warning. Samples with equal timestamps keep
/// their log order.
pub fn query(
    samples: &[HistoricalSample],
    node_id: &str,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Vec<HistoricalSample> {
    let mut dropped = 0usize;

    let mut matched: Vec<(DateTime<Utc>, &HistoricalSample)> = samples
        .iter()
        .filter(|s| s.node_id == node_id)
        .filter_map(|s| match s.parsed_timestamp() {
            Ok(ts) => Some((ts, s)),
            Err(e) => {
                dropped += 1;
                warn!(node_id = %s.node_id, error = %e, "Skipping history entry");
                None
            }
        })
        .filter(|(ts, _)| start.map_or(true, |lo| *ts >= lo))
        .filter(|(ts, _)| end.map_or(true, |hi| *ts <= hi))
        .collect();

    matched.sort_by_key(|(ts, _)| *ts);

    debug!(
        node_id,
        matched = matched.len(),
        dropped,
        "History query completed"
    );

    matched.into_iter().map(|(_, s)| s.clone()).collect()
}

/// Parses an optional query bound. Blank text counts as absent.
pub fn parse_bound(
    bound: &'static str,
    text: Option<&str>,
) -> HistoryResult<Option<DateTime<Utc>>> {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        None => Ok(None),
        Some(t) => parse_timestamp(t)
            .map(Some)
            .map_err(|_| HistoryError::invalid_bound(bound, t)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(node: &str, ts: &str, value: &str) -> HistoricalSample {
        HistoricalSample::new(node, ts, value)
    }

    fn bound(text: &str) -> Option<DateTime<Utc>> {
        parse_bound("start_time", Some(text)).unwrap()
    }

    #[test]
    fn test_window_selects_inner_sample() {
        let log = vec![
            sample("T1", "2024-05-01T09:00:00", "1"),
            sample("T1", "2024-05-01T10:00:00", "2"),
            sample("T1", "2024-05-01T11:00:00", "3"),
        ];

        let result = query(
            &log,
            "T1",
            bound("2024-05-01T09:30:00"),
            bound("2024-05-01T10:30:00"),
        );
        assert_eq!(result, vec![sample("T1", "2024-05-01T10:00:00", "2")]);
    }

    #[test]
    fn test_malformed_entry_dropped_and_rest_sorted() {
        let log = vec![
            sample("T1", "2024-05-01T11:00:00", "late"),
            sample("T1", "not a time", "bad"),
            sample("T1", "2024-05-01T09:00:00", "early"),
        ];

        let values: Vec<_> = query(&log, "T1", None, None)
            .into_iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec!["early", "late"]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let log = vec![
            sample("T1", "2024-05-01T09:00:00", "a"),
            sample("T1", "2024-05-01T10:00:00", "b"),
        ];
        let result = query(
            &log,
            "T1",
            bound("2024-05-01T09:00:00"),
            bound("2024-05-01T10:00:00"),
        );
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_node_match_is_exact() {
        let log = vec![
            sample("T1", "2024-05-01T09:00:00", "a"),
            sample("T10", "2024-05-01T09:00:00", "b"),
            sample("t1", "2024-05-01T09:00:00", "c"),
        ];
        let result = query(&log, "T1", None, None);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].value, "a");
    }

    #[test]
    fn test_ties_keep_log_order() {
        let log = vec![
            sample("T1", "2024-05-01T10:00:00Z", "first"),
            sample("T1", "2024-05-01T09:00:00", "earlier"),
            sample("T1", "2024-05-01T12:00:00+02:00", "second"),
        ];
        let values: Vec<_> = query(&log, "T1", None, None)
            .into_iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec!["earlier", "first", "second"]);
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let log = vec![sample("T1", "2024-05-01T10:00:00", "a")];
        let result = query(
            &log,
            "T1",
            bound("2024-05-01T11:00:00"),
            bound("2024-05-01T09:00:00"),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_input_untouched() {
        let log = vec![
            sample("T1", "2024-05-01T11:00:00", "b"),
            sample("T1", "2024-05-01T10:00:00", "a"),
        ];
        let before = log.clone();
        let _ = query(&log, "T1", None, None);
        assert_eq!(log, before);
    }

    #[test]
    fn test_parse_bound() {
        assert_eq!(parse_bound("end_time", None).unwrap(), None);
        assert_eq!(parse_bound("end_time", Some("  ")).unwrap(), None);

        let err = parse_bound("end_time", Some("tomorrow")).unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("end_time"));
    }
}
