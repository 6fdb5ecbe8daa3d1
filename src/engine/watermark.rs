//! Record-drawn watermarks
//!
//! Tracks the largest replication value seen in a partition's records and
//! verifies the ascending order the provider was asked for.

use super::types::OrderCheck;
use crate::datetime::{compare_values, parse_value};
use crate::error::{Error, Result};
use crate::stream::IncrementalConfig;
use crate::types::lookup_path;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use tracing::warn;

/// Largest replication value of the records seen so far
pub(crate) struct WatermarkTracker<'a> {
    stream: &'a str,
    path: &'a str,
    check: OrderCheck,
    floor: Option<Value>,
    latest: Option<Value>,
    refilter: Option<(&'a IncrementalConfig, DateTime<Utc>)>,
    unordered: bool,
}

impl<'a> WatermarkTracker<'a> {
    pub(crate) fn new(stream: &'a str, path: &'a str, check: OrderCheck) -> Self {
        Self {
            stream,
            path,
            check,
            floor: None,
            latest: None,
            refilter: None,
            unordered: false,
        }
    }

    /// Lower bound the watermark has to exceed to count as moving forward
    pub(crate) fn with_floor(mut self, floor: Value) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Re-derive the filter of `config` from the watermark, up to `upper`
    pub(crate) fn with_refilter(
        mut self,
        config: &'a IncrementalConfig,
        upper: DateTime<Utc>,
    ) -> Self {
        self.refilter = Some((config, upper));
        self
    }

    /// Fold a page into the watermark; returns whether it moved forward
    pub(crate) fn observe(&mut self, records: &[Value]) -> Result<bool> {
        let before = self.latest.clone().or_else(|| self.floor.clone());

        for record in records {
            let Some(value) = lookup_path(record, self.path).filter(|v| !v.is_null()) else {
                warn!(stream = self.stream, path = self.path, "Record has no replication value");
                continue;
            };

            let Some(latest) = &self.latest else {
                self.latest = Some(value.clone());
                continue;
            };
            match compare_values(value, latest) {
                Some(Ordering::Greater) => self.latest = Some(value.clone()),
                Some(Ordering::Equal) => {}
                Some(Ordering::Less) => {
                    let message = format!("{value} arrived after {latest}");
                    self.out_of_order(message)?;
                }
                None => warn!(
                    stream = self.stream,
                    value = %value,
                    "Replication value is not comparable with the watermark"
                ),
            }
        }

        Ok(match (&before, &self.latest) {
            (None, Some(_)) => true,
            (Some(b), Some(l)) => compare_values(l, b) == Some(Ordering::Greater),
            _ => false,
        })
    }

    /// Under `Warn`, the rest of the range is drained by offset from then on
    fn out_of_order(&mut self, message: String) -> Result<()> {
        match self.check {
            OrderCheck::Warn => {
                warn!(stream = self.stream, key = self.path, "Records out of order: {message}");
                self.unordered = true;
                Ok(())
            }
            OrderCheck::Reject => Err(Error::OrderViolation {
                stream: self.stream.to_string(),
                key: self.path.to_string(),
                message,
            }),
        }
    }

    /// Filter parameter and value for the range starting at the watermark
    ///
    /// `None` once records arrived out of order, since values below the
    /// watermark may still sit on later pages of the current filter.
    pub(crate) fn refilter(&self) -> Option<(&'a str, String)> {
        if self.unordered {
            return None;
        }
        let (config, upper) = self.refilter?;
        let lower = parse_value(self.latest.as_ref()?).ok()?;
        Some((config.filter_param.as_str(), config.filter_value(lower, upper)))
    }

    /// Final watermark
    pub(crate) fn into_latest(self) -> Option<Value> {
        self.latest
    }
}
