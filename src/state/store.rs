//! Bookmark store
//!
//! Guards every bookmark write: values never regress, and a write that
//! cannot be persisted is undone in memory before the error surfaces.

use super::sink::StateSink;
use super::types::State;
use crate::datetime::{compare_values, normalize};
use crate::error::{Error, Result};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};

/// Bookmark store backed by zero or more state sinks
pub struct BookmarkStore {
    state: State,
    sinks: Vec<Arc<dyn StateSink>>,
}

impl BookmarkStore {
    /// Create a store from previously persisted state
    pub fn new(state: State) -> Self {
        Self {
            state,
            sinks: Vec::new(),
        }
    }

    /// Create an empty store that persists nowhere
    pub fn in_memory() -> Self {
        Self::new(State::new())
    }

    /// Persist to `sink` after every mutation
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn StateSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Current state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Stored bookmark value
    pub fn get(&self, stream: &str, partition: &str, key: &str) -> Option<&Value> {
        self.state.get(stream, partition, key)
    }

    /// Write `default` unless a bookmark already exists.
    ///
    /// Returns whether the bookmark was seeded. Seeding an existing bookmark
    /// is a no-op and persists nothing.
    pub async fn seed_if_absent(
        &mut self,
        stream: &str,
        partition: &str,
        key: &str,
        default: Value,
    ) -> Result<bool> {
        if self.get(stream, partition, key).is_some() {
            return Ok(false);
        }

        let value = normalize(&default);
        debug!(stream, partition, key, value = %value, "Seeding bookmark");
        self.write(stream, partition, key, value).await?;
        Ok(true)
    }

    /// Overwrite a bookmark and persist it before returning.
    ///
    /// A value lower than the stored one is ignored with a warning.
    pub async fn update(
        &mut self,
        stream: &str,
        partition: &str,
        key: &str,
        value: Value,
    ) -> Result<()> {
        let value = normalize(&value);

        if let Some(current) = self.get(stream, partition, key) {
            if compare_values(&value, current) == Some(Ordering::Less) {
                warn!(
                    stream,
                    partition,
                    key,
                    current = %current,
                    rejected = %value,
                    "Ignoring bookmark update that would move backwards"
                );
                return Ok(());
            }
        }

        debug!(stream, partition, key, value = %value, "Advancing bookmark");
        self.write(stream, partition, key, value).await
    }

    /// Persist the current state to every sink without changing it
    pub async fn flush(&self) -> Result<()> {
        self.persist().await
    }

    async fn write(
        &mut self,
        stream: &str,
        partition: &str,
        key: &str,
        value: Value,
    ) -> Result<()> {
        let previous = self.state.set(stream, partition, key, value);

        if let Err(e) = self.persist().await {
            self.state.restore(stream, partition, key, previous);
            return Err(e);
        }
        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        for sink in &self.sinks {
            sink.persist(&self.state).await.map_err(|e| match e {
                Error::StateWrite { .. } => e,
                other => Error::state_write(other.to_string()),
            })?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for BookmarkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookmarkStore")
            .field("state", &self.state)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
