// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Sample log storage.
//!
//! The history log is append-only. Readers load the whole log and run
//! [`crate::query`] over it; writers only ever add whole records.
//!
//! # Example
//!
//! ```rust,ignore
//! use uadash_history::{HistoricalSample, JsonLinesLog, SampleLog};
//!
//! let log = JsonLinesLog::new("history.jsonl");
//! log.append(HistoricalSample::now("ns=2;s=Tank.Level", "42.5")).await?;
//! let samples = log.load_all().await?;
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{HistoryError, HistoryResult};
use crate::sample::HistoricalSample;

// =============================================================================
// SampleLog Trait
// =============================================================================

/// An append-only store of historical samples.
#[async_trait]
pub trait SampleLog: Send + Sync {
    /// Returns every sample in log order.
    async fn load_all(&self) -> HistoryResult<Vec<HistoricalSample>>;

    /// Appends one sample.
    async fn append(&self, sample: HistoricalSample) -> HistoryResult<()>;

    /// Returns a short name for logging.
    fn name(&self) -> &str;
}

// =============================================================================
// JsonLinesLog
// =============================================================================

/// A JSON-lines file with one sample per line.
///
/// Lines that fail to parse, including a partially written last line, are
/// skipped with a warning. A missing file reads as an empty log.
#[derive(Debug)]
pub struct JsonLinesLog {
    path: PathBuf,
    append_lock: tokio::sync::Mutex<()>,
}

impl JsonLinesLog {
    /// Creates a log backed by `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns the log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str) -> Vec<HistoricalSample> {
        let mut samples = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoricalSample>(line) {
                Ok(sample) => samples.push(sample),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = idx + 1,
                    error = %e,
                    "Skipping corrupt history line"
                ),
            }
        }

        samples
    }
}

#[async_trait]
impl SampleLog for JsonLinesLog {
    async fn load_all(&self) -> HistoryResult<Vec<HistoricalSample>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(HistoryError::io(&self.path, e)),
        };

        let samples = self.parse(&content);
        debug!(path = %self.path.display(), count = samples.len(), "History log loaded");
        Ok(samples)
    }

    async fn append(&self, sample: HistoricalSample) -> HistoryResult<()> {
        let mut line =
            serde_json::to_string(&sample).map_err(|e| HistoryError::serialization(e.to_string()))?;
        line.push('\n');

        let _guard = self.append_lock.lock().await;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| HistoryError::io(&self.path, e))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| HistoryError::io(&self.path, e))?;
        file.flush()
            .await
            .map_err(|e| HistoryError::io(&self.path, e))?;

        Ok(())
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}

// =============================================================================
// MemoryLog
// =============================================================================

/// An in-memory log for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryLog {
    samples: RwLock<Vec<HistoricalSample>>,
}

impl MemoryLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log pre-filled with `samples`.
    pub fn with_samples(samples: Vec<HistoricalSample>) -> Self {
        Self {
            samples: RwLock::new(samples),
        }
    }

    /// Returns the number of stored samples.
    pub fn len(&self) -> usize {
        self.samples.read().len()
    }

    /// Returns `true` if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.read().is_empty()
    }
}

#[async_trait]
impl SampleLog for MemoryLog {
    async fn load_all(&self) -> HistoryResult<Vec<HistoricalSample>> {
        Ok(self.samples.read().clone())
    }

    async fn append(&self, sample: HistoricalSample) -> HistoryResult<()> {
        self.samples.write().push(sample);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// =============================================================================
// Tests
// =============================================================================
