//! Engine types
//!
//! Configuration, statistics and per-run reports of the sync engine.

use serde_json::Value;

/// Reaction to records that are not sorted ascending by replication value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderCheck {
    /// Log a warning and keep the largest value seen
    #[default]
    Warn,
    /// Fail the partition
    Reject,
}

/// Configuration for sync operation
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Whether a partition failure stops the whole run
    pub fail_fast: bool,
    /// Ordering verification for record-drawn watermarks
    pub order_check: OrderCheck,
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set fail fast mode
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set ordering verification
    #[must_use]
    pub fn with_order_check(mut self, order_check: OrderCheck) -> Self {
        self.order_check = order_check;
        self
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Total records emitted
    pub records_synced: usize,
    /// Total pages fetched
    pub pages_fetched: usize,
    /// Total streams synced
    pub streams_synced: usize,
    /// Partitions that ran to completion
    pub partitions_synced: usize,
    /// Partitions aborted by an error
    pub partitions_failed: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records
    pub fn add_records(&mut self, count: usize) {
        self.records_synced += count;
    }

    /// Add pages
    pub fn add_pages(&mut self, count: usize) {
        self.pages_fetched += count;
    }

    /// Add a stream
    pub fn add_stream(&mut self) {
        self.streams_synced += 1;
    }

    /// Add a completed partition
    pub fn add_partition(&mut self) {
        self.partitions_synced += 1;
    }

    /// Add a failed partition
    pub fn add_failure(&mut self) {
        self.partitions_failed += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

/// How one partition's loop ended
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionOutcome {
    /// Loop exhausted, bookmark committed
    Completed {
        /// Records emitted
        records: usize,
        /// Requests issued
        pages: usize,
        /// Bookmark after the run, for incremental streams
        bookmark: Option<Value>,
    },
    /// Loop aborted; the bookmark was left where it was
    Failed {
        /// Records emitted before the failure
        records: usize,
        /// Error description
        error: String,
    },
}

/// Result of one partition
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionReport {
    /// Partition id
    pub partition: String,
    /// Outcome
    pub outcome: PartitionOutcome,
}

impl PartitionReport {
    /// Whether the partition failed
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, PartitionOutcome::Failed { .. })
    }

    /// Records emitted for this partition
    pub fn records(&self) -> usize {
        match self.outcome {
            PartitionOutcome::Completed { records, .. }
            | PartitionOutcome::Failed { records, .. } => records,
        }
    }
}

/// Result of one stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamReport {
    /// Stream name
    pub stream: String,
    /// Per-partition results, in sync order
    pub partitions: Vec<PartitionReport>,
}

impl StreamReport {
    /// Records emitted across partitions
    pub fn records(&self) -> usize {
        self.partitions.iter().map(PartitionReport::records).sum()
    }

    /// Failed partitions
    pub fn failures(&self) -> impl Iterator<Item = &PartitionReport> {
        self.partitions.iter().filter(|p| p.is_failed())
    }

    /// Report of one partition
    pub fn partition(&self, id: &str) -> Option<&PartitionReport> {
        self.partitions.iter().find(|p| p.partition == id)
    }
}

/// Result of a whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Per-stream results, in sync order
    pub streams: Vec<StreamReport>,
    /// Totals
    pub stats: SyncStats,
}

impl SyncReport {
    /// Whether any partition failed
    pub fn has_failures(&self) -> bool {
        self.streams.iter().any(|s| s.failures().next().is_some())
    }

    /// Process exit status: 0 when clean, 2 when some partition failed
    pub fn exit_code(&self) -> i32 {
        if self.has_failures() {
            2
        } else {
            0
        }
    }

    /// Report of one stream
    pub fn stream(&self, name: &str) -> Option<&StreamReport> {
        self.streams.iter().find(|s| s.stream == name)
    }
}
