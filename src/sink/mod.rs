//! Record sink module
//!
//! Messages leave the tap as Singer JSON lines: a `SCHEMA` message per
//! stream, then its `RECORD`s, interleaved with `STATE` checkpoints.
//!
//! # Overview
//!
//! - [`Message`] - The three message kinds and their wire shape
//! - [`RecordSink`] - Where schemas and records go
//! - [`SingerWriter`] - JSON lines on any `Write`, usually stdout
//! - [`MemorySink`] - Collects messages in memory

mod memory;
mod message;
mod writer;

pub use memory::MemorySink;
pub use message::{Message, RecordSink};
pub use writer::SingerWriter;

#[cfg(test)]
mod tests;
