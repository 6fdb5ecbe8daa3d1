//! Tap configuration
//!
//! The configuration is a flat JSON object supplied by the operator:
//!
//! ```json
//! {
//!   "start_date": "2020-01-01T00:00:00Z",
//!   "access_token": "...",
//!   "space_id": "..."
//! }
//! ```
//!
//! Which keys are required depends on the provider definition; `start_date`
//! is always required. Validation happens once, before any stream is synced.

use crate::datetime;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Key holding the lower bound of the first incremental sync
pub const START_DATE_KEY: &str = "start_date";

/// Validated tap configuration
#[derive(Debug, Clone)]
pub struct TapConfig {
    start_date: DateTime<Utc>,
    values: JsonObject,
}

impl TapConfig {
    /// Build a config from a JSON value, checking `required` keys
    pub fn from_value(value: JsonValue, required: &[String]) -> Result<Self> {
        let JsonValue::Object(values) = value else {
            return Err(Error::config("Config must be a JSON object"));
        };

        let missing: Vec<&str> = std::iter::once(START_DATE_KEY)
            .chain(required.iter().map(String::as_str))
            .filter(|key| !has_value(values.get(*key)))
            .collect();
        if !missing.is_empty() {
            return Err(Error::missing_field(missing.join(", ")));
        }

        let raw_start = values
            .get(START_DATE_KEY)
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::invalid_value(START_DATE_KEY, "expected a string"))?;
        let start_date = datetime::parse_datetime(raw_start)
            .map_err(|e| Error::invalid_value(START_DATE_KEY, e.to_string()))?;

        Ok(Self { start_date, values })
    }

    /// Parse a config from a JSON string
    pub fn from_json(json: &str, required: &[String]) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        Self::from_value(value, required)
    }

    /// Load a config file
    pub fn from_file(path: impl AsRef<Path>, required: &[String]) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json(&contents, required)
    }

    /// Configured start date
    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    /// Ordered string list from a key holding an array or a single value
    pub fn get_list(&self, key: &str) -> Result<Vec<String>> {
        match self.values.get(key) {
            Some(JsonValue::Array(items)) => items
                .iter()
                .map(|item| match item {
                    JsonValue::String(s) if !s.is_empty() => Ok(s.clone()),
                    JsonValue::Number(n) => Ok(n.to_string()),
                    other => Err(Error::invalid_value(
                        key,
                        format!("expected string identifiers, got {other}"),
                    )),
                })
                .collect(),
            Some(JsonValue::String(s)) if !s.is_empty() => {
                Ok(s.split(',').map(|s| s.trim().to_string()).collect())
            }
            Some(JsonValue::Number(n)) => Ok(vec![n.to_string()]),
            Some(other) => Err(Error::invalid_value(
                key,
                format!("expected a list of identifiers, got {other}"),
            )),
            None => Err(Error::missing_field(key)),
        }
    }

    /// The whole config as JSON, for template rendering
    pub fn as_value(&self) -> JsonValue {
        JsonValue::Object(self.values.clone())
    }
}

fn has_value(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => false,
        Some(JsonValue::String(s)) => !s.is_empty(),
        Some(JsonValue::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}
