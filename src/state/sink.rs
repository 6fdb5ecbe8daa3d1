//! State persistence targets

use super::types::State;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination of persisted state
///
/// `persist` is awaited inside every bookmark mutation, so an `Ok` return
/// means the state is durable as far as this sink is concerned.
#[async_trait]
pub trait StateSink: Send + Sync {
    /// Persist a full snapshot of the state
    async fn persist(&self, state: &State) -> Result<()>;
}

/// JSON state file, replaced atomically on every write
#[derive(Debug, Clone)]
pub struct FileStateSink {
    path: PathBuf,
}

impl FileStateSink {
    /// Create a sink writing to `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateSink for FileStateSink {
    async fn persist(&self, state: &State) -> Result<()> {
        let contents = serde_json::to_string_pretty(state).map_err(|e| Error::StateWrite {
            message: format!("Failed to serialize state: {e}"),
        })?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::StateWrite {
                message: format!("Failed to write state file: {e}"),
            })?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::StateWrite {
                message: format!("Failed to rename state file: {e}"),
            })?;

        debug!(path = %self.path.display(), "State file written");
        Ok(())
    }
}

/// Discards state
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStateSink;

#[async_trait]
impl StateSink for NullStateSink {
    async fn persist(&self, _state: &State) -> Result<()> {
        Ok(())
    }
}
