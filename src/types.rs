//! Common types used throughout rest-tap
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Ordered key-value map with string keys and values.
///
/// Ordered so that rendered requests are deterministic.
pub type StringMap = BTreeMap<String, String>;

// ============================================================================
// Replication Mode
// ============================================================================

/// How a stream is replicated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicationMode {
    /// Re-extract everything every run
    #[default]
    Full,
    /// Only extract records newer than the partition bookmark
    Incremental,
}

impl ReplicationMode {
    /// Singer catalog name of the replication method
    pub fn as_catalog_str(&self) -> &'static str {
        match self {
            Self::Full => "FULL_TABLE",
            Self::Incremental => "INCREMENTAL",
        }
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Utilities
// ============================================================================

/// Look up a dotted path (`sys.updatedAt`) in a JSON value
pub fn lookup_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        match current {
            JsonValue::Object(map) => current = map.get(part)?,
            _ => return None,
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replication_mode_serde() {
        let mode: ReplicationMode = serde_json::from_str("\"incremental\"").unwrap();
        assert_eq!(mode, ReplicationMode::Incremental);

        let json = serde_json::to_string(&ReplicationMode::Full).unwrap();
        assert_eq!(json, "\"full\"");
    }

    #[test]
    fn test_replication_mode_catalog_name() {
        assert_eq!(ReplicationMode::Full.as_catalog_str(), "FULL_TABLE");
        assert_eq!(ReplicationMode::Incremental.as_catalog_str(), "INCREMENTAL");
    }

    #[test]
    fn test_lookup_path() {
        let value = json!({"sys": {"id": "abc", "updatedAt": "2020-01-01T00:00:00Z"}});
        assert_eq!(lookup_path(&value, "sys.id"), Some(&json!("abc")));
        assert_eq!(
            lookup_path(&value, "$.sys.updatedAt"),
            Some(&json!("2020-01-01T00:00:00Z"))
        );
        assert_eq!(lookup_path(&value, "sys.missing"), None);
        assert_eq!(lookup_path(&value, "sys.id.deeper"), None);
        assert_eq!(lookup_path(&value, ""), Some(&value));
    }
}
