//! State management module
//!
//! Tracks the per-partition high-water mark of every incremental stream.
//! State is persisted between sync runs to enable incremental syncs.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - Serializable `stream -> partition -> key -> value` mapping
//! - `BookmarkStore` - Guarded reads and writes, persisted on every mutation
//! - `StateSink` - Where persisted state goes (file, message stream, nowhere)

mod sink;
mod store;
mod types;

pub use sink::{FileStateSink, NullStateSink, StateSink};
pub use store::BookmarkStore;
pub use types::State;
