//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Replication key -> bookmark value
pub type PartitionBookmarks = BTreeMap<String, Value>;

/// Partition id -> bookmarks
pub type StreamBookmarks = BTreeMap<String, PartitionBookmarks>;

/// Complete state of a tap
///
/// Serialized as `{"bookmarks": {stream: {partition: {key: value}}}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream bookmarks
    #[serde(default)]
    pub bookmarks: BTreeMap<String, StreamBookmarks>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse state from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::State {
            message: format!("Failed to parse state JSON: {e}"),
        })
    }

    /// Load state from a file; a missing file is an empty state
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| Error::State {
            message: format!("Failed to read state file: {e}"),
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::new());
        }
        Self::from_json(&contents)
    }

    /// Whether no bookmark has been written yet
    pub fn is_empty(&self) -> bool {
        self.bookmarks.values().all(|partitions| {
            partitions
                .values()
                .all(std::collections::BTreeMap::is_empty)
        })
    }

    /// Bookmark value
    pub fn get(&self, stream: &str, partition: &str, key: &str) -> Option<&Value> {
        self.bookmarks.get(stream)?.get(partition)?.get(key)
    }

    /// Write a bookmark value, returning the one it replaced
    pub fn set(&mut self, stream: &str, partition: &str, key: &str, value: Value) -> Option<Value> {
        self.bookmarks
            .entry(stream.to_string())
            .or_default()
            .entry(partition.to_string())
            .or_default()
            .insert(key.to_string(), value)
    }

    /// Put back a value returned by [`set`](Self::set)
    pub(crate) fn restore(
        &mut self,
        stream: &str,
        partition: &str,
        key: &str,
        previous: Option<Value>,
    ) {
        match previous {
            Some(value) => {
                self.set(stream, partition, key, value);
            }
            None => {
                let Some(partitions) = self.bookmarks.get_mut(stream) else {
                    return;
                };
                if let Some(keys) = partitions.get_mut(partition) {
                    keys.remove(key);
                    if keys.is_empty() {
                        partitions.remove(partition);
                    }
                }
                if partitions.is_empty() {
                    self.bookmarks.remove(stream);
                }
            }
        }
    }

    /// Serialize as a JSON value
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
