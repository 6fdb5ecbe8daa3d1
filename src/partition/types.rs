//! Partition types
//!
//! Defines the partition value and the per-stream partitioning rule.

use crate::config::TapConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Id of the single partition of an unpartitioned stream
pub const DEFAULT_PARTITION: &str = "default";

/// One sub-resource of a stream
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    /// Partition identifier
    pub id: String,
}

impl Partition {
    /// Create a new partition
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The partition of an unpartitioned stream
    pub fn implicit() -> Self {
        Self::new(DEFAULT_PARTITION)
    }

    /// Set `field` on every object record to this partition's id
    pub fn hydrate(&self, record: &mut Value, field: &str) {
        if let Value::Object(map) = record {
            map.insert(field.to_string(), Value::String(self.id.clone()));
        }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// How a stream is partitioned
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Partitioning {
    /// One implicit partition
    #[default]
    None,
    /// One partition per id listed under a config key
    Config {
        /// Config key holding the ids (array or comma-separated string)
        key: String,
        /// Record field to set to the partition id, for endpoints that omit it
        #[serde(default)]
        field: Option<String>,
    },
}

impl Partitioning {
    /// Enumerate partitions in config order, without duplicates
    pub fn partitions(&self, config: &TapConfig) -> Result<Vec<Partition>> {
        match self {
            Self::None => Ok(vec![Partition::implicit()]),
            Self::Config { key, .. } => {
                let ids = config.get_list(key)?;
                let mut seen = HashSet::new();
                let partitions: Vec<Partition> = ids
                    .into_iter()
                    .filter(|id| !id.is_empty() && seen.insert(id.clone()))
                    .map(Partition::new)
                    .collect();

                if partitions.is_empty() {
                    return Err(Error::invalid_value(key.as_str(), "no partition ids configured"));
                }
                Ok(partitions)
            }
        }
    }

    /// Config key the partition ids come from
    pub fn config_key(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Config { key, .. } => Some(key),
        }
    }

    /// Record field hydrated with the partition id
    pub fn hydrate_field(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Config { field, .. } => field.as_deref(),
        }
    }
}
