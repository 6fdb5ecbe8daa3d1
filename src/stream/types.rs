//! Stream descriptor types
//!
//! Deserialized from the `streams` list of a provider definition and never
//! mutated afterwards.

use crate::datetime::ValueFormat;
use crate::envelope::Envelope;
use crate::pagination::PaginationConfig;
use crate::partition::Partitioning;
use crate::types::{ReplicationMode, StringMap};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ============================================================================
// Stream Descriptor
// ============================================================================

/// One extractable entity of a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Stream name, unique within a provider
    pub name: String,
    /// Path template, relative to the provider base URL
    pub path: String,
    /// Natural key fields, announced with the schema
    #[serde(default)]
    pub key_properties: Vec<String>,
    /// Replication settings
    #[serde(default)]
    pub replication: Replication,
    /// Where records live in a response
    #[serde(default)]
    pub envelope: Envelope,
    /// How pages are requested
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// How the stream is split by sub-resource
    #[serde(default)]
    pub partitions: Partitioning,
    /// Static query parameters (templates)
    #[serde(default)]
    pub params: StringMap,
    /// Static headers (templates)
    #[serde(default)]
    pub headers: StringMap,
    /// JSON schema announced before the first record
    #[serde(default = "default_schema")]
    pub schema: Value,
    /// Whether the stream syncs when no selection is given
    #[serde(default = "default_selected")]
    pub selected_by_default: bool,
}

fn default_schema() -> Value {
    json!({"type": "object", "additionalProperties": true})
}

fn default_selected() -> bool {
    true
}

impl StreamDescriptor {
    /// Replication mode
    pub fn mode(&self) -> ReplicationMode {
        match self.replication {
            Replication::Full => ReplicationMode::Full,
            Replication::Incremental(_) => ReplicationMode::Incremental,
        }
    }

    /// Incremental settings, if the stream is incremental
    pub fn incremental(&self) -> Option<&IncrementalConfig> {
        match &self.replication {
            Replication::Full => None,
            Replication::Incremental(config) => Some(config),
        }
    }

    /// Replication key, if the stream is incremental
    pub fn replication_key(&self) -> Option<&str> {
        self.incremental().map(|c| c.replication_key.as_str())
    }

    /// Fields announced as bookmark properties
    pub fn bookmark_properties(&self) -> Vec<String> {
        self.replication_key()
            .map(|k| vec![k.to_string()])
            .unwrap_or_default()
    }
}

// ============================================================================
// Replication
// ============================================================================

/// Full-table or incremental replication
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Replication {
    /// Re-extract everything, no bookmarks
    #[default]
    Full,
    /// Extract the range after the partition bookmark
    Incremental(IncrementalConfig),
}

/// Settings of an incremental stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementalConfig {
    /// Bookmark key inside the partition's state
    pub replication_key: String,
    /// Request parameter carrying the range
    pub filter_param: String,
    /// How the range is spelled in `filter_param`
    #[serde(default)]
    pub filter: FilterEncoding,
    /// How bounds are formatted
    #[serde(default)]
    pub value_format: ValueFormat,
    /// How far one run reaches
    #[serde(default)]
    pub window: WindowPolicy,
    /// What is committed at the end of a partition
    #[serde(default)]
    pub watermark: WatermarkSource,
}

/// Spelling of the range in the filter parameter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterEncoding {
    /// Lower bound only
    #[default]
    LowerBound,
    /// `lower<separator>upper`
    Range {
        /// Separator between the bounds
        #[serde(default = "default_separator")]
        separator: String,
    },
}

fn default_separator() -> String {
    ",".to_string()
}

/// Upper bound of one run's range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WindowPolicy {
    /// Up to the wall clock at loop start
    #[default]
    Unbounded,
    /// At most `days` after the lower bound
    Fixed {
        /// Window length in days
        days: u32,
        /// Lower bound of the first-ever run, instead of the configured start date
        #[serde(default)]
        epoch: Option<DateTime<Utc>>,
    },
}

/// Value committed as the new bookmark
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WatermarkSource {
    /// The upper bound of the range
    #[default]
    Window,
    /// The latest replication value seen in the records
    Record {
        /// Dotted path of the replication value inside a record
        path: String,
        /// Request parameter asking the provider to sort
        order_param: String,
        /// Sort expression, ascending on `path`
        order_value: String,
        /// Re-derive the filter from the watermark after every full page
        #[serde(default = "default_refilter")]
        refilter: bool,
    },
}

fn default_refilter() -> bool {
    true
}

/// Half-open `[lower, upper)` range of one partition run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncRange {
    /// Inclusive lower bound
    pub lower: DateTime<Utc>,
    /// Exclusive upper bound
    pub upper: DateTime<Utc>,
}

impl IncrementalConfig {
    /// Bookmark written when a partition has none yet
    pub fn seed(&self, start_date: DateTime<Utc>) -> DateTime<Utc> {
        match &self.window {
            WindowPolicy::Fixed {
                epoch: Some(epoch), ..
            } => *epoch,
            _ => start_date,
        }
    }

    /// Range following `last`, never reaching past `now`.
    ///
    /// A bookmark ahead of `now` yields an empty range at the bookmark.
    pub fn range(&self, last: DateTime<Utc>, now: DateTime<Utc>) -> SyncRange {
        let upper = match &self.window {
            WindowPolicy::Unbounded => now,
            WindowPolicy::Fixed { days, .. } => {
                let end = last
                    .checked_add_signed(Duration::days(i64::from(*days)))
                    .unwrap_or(now);
                end.min(now)
            }
        };

        SyncRange {
            lower: last,
            upper: upper.max(last),
        }
    }

    /// Value of the filter parameter for `[lower, upper)`
    pub fn filter_value(&self, lower: DateTime<Utc>, upper: DateTime<Utc>) -> String {
        match &self.filter {
            FilterEncoding::LowerBound => self.value_format.format(lower),
            FilterEncoding::Range { separator } => format!(
                "{}{separator}{}",
                self.value_format.format(lower),
                self.value_format.format(upper)
            ),
        }
    }

    /// Order parameter, when the watermark is drawn from records
    pub fn order(&self) -> Option<(&str, &str)> {
        match &self.watermark {
            WatermarkSource::Record {
                order_param,
                order_value,
                ..
            } => Some((order_param, order_value)),
            WatermarkSource::Window => None,
        }
    }
}
