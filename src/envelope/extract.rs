//! Record extraction from response bodies

use crate::error::{Error, Result};
use crate::types::lookup_path;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where the records of a response live
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Dotted path of the record array; `None` means the body itself
    #[serde(default)]
    pub key: Option<String>,
    /// Dotted path of the provider-reported record count
    #[serde(default)]
    pub count_field: Option<String>,
}

/// Records taken out of one response body
#[derive(Debug, Clone, Default)]
pub struct Opened {
    /// Records in response order
    pub records: Vec<Value>,
    /// Count reported by the provider, if it reports one
    pub reported_count: Option<u64>,
}

impl Envelope {
    /// Envelope with records under `key`
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            count_field: None,
        }
    }

    /// Envelope whose body is the record array itself
    pub fn bare() -> Self {
        Self::default()
    }

    /// Set the count field path
    #[must_use]
    pub fn with_count_field(mut self, path: impl Into<String>) -> Self {
        self.count_field = Some(path.into());
        self
    }

    /// Read the provider-reported count.
    ///
    /// Counts may be numbers or numeric strings.
    pub fn reported_count(&self, body: &Value) -> Option<u64> {
        let value = lookup_path(body, self.count_field.as_deref()?)?;
        match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Take the records out of a response body.
    ///
    /// A bare object becomes a one-element batch and an explicit `null` an
    /// empty one. A missing key is an error unless the provider reports a
    /// count of zero, which some endpoints do instead of sending an empty
    /// array.
    pub fn open(&self, mut body: Value) -> Result<Opened> {
        let reported_count = self.reported_count(&body);

        let Some(key) = self.key.as_deref() else {
            return Ok(Opened {
                records: normalize(body, "$")?,
                reported_count,
            });
        };

        let pointer = to_pointer(key);
        let Some(slot) = body.pointer_mut(&pointer) else {
            if reported_count == Some(0) {
                return Ok(Opened {
                    records: Vec::new(),
                    reported_count,
                });
            }
            return Err(Error::envelope(key, "field is missing from the response"));
        };

        Ok(Opened {
            records: normalize(slot.take(), key)?,
            reported_count,
        })
    }
}

fn normalize(value: Value, key: &str) -> Result<Vec<Value>> {
    match value {
        Value::Array(records) => Ok(records),
        Value::Null => Ok(Vec::new()),
        object @ Value::Object(_) => Ok(vec![object]),
        other => Err(Error::envelope(
            key,
            format!("expected an array or object, found {other}"),
        )),
    }
}

/// Dotted path to a JSON pointer (`a.b` to `/a/b`)
fn to_pointer(path: &str) -> String {
    let path = path.strip_prefix("$.").unwrap_or(path);
    path.split('.')
        .map(|part| format!("/{}", part.replace('~', "~0").replace('/', "~1")))
        .collect()
}
