//! Partition module
//!
//! A stream is split by sub-resource (club, space) when its provider
//! addresses records per sub-resource. Partition ids come from the tap
//! config only; bookmarks and request parameters are partition-scoped.

mod types;

pub use types::{Partition, Partitioning, DEFAULT_PARTITION};

#[cfg(test)]
mod tests;
