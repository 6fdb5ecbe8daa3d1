//! Stream descriptors
//!
//! Static metadata of one provider entity: where it lives, how it pages,
//! how it is partitioned and how its replication range is expressed.

mod types;

pub use types::{
    FilterEncoding, IncrementalConfig, Replication, StreamDescriptor, SyncRange, WatermarkSource,
    WindowPolicy,
};

#[cfg(test)]
mod tests;
