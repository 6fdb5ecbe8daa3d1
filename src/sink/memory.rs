//! In-memory sink

use super::message::{Message, RecordSink};
use crate::error::Result;
use crate::state::{State, StateSink};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

/// Collects messages in memory; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Every message written so far
    pub fn messages(&self) -> Vec<Message> {
        self.lock().clone()
    }

    /// Record payloads of one stream, in emission order
    pub fn records(&self, stream: &str) -> Vec<Value> {
        self.lock()
            .iter()
            .filter_map(|m| match m {
                Message::Record {
                    stream: s, record, ..
                } if s == stream => Some(record.clone()),
                _ => None,
            })
            .collect()
    }

    /// State snapshots, in emission order
    pub fn states(&self) -> Vec<Value> {
        self.lock()
            .iter()
            .filter_map(|m| match m {
                Message::State { value } => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    /// Discard everything collected
    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn write(&self, message: Message) -> Result<()> {
        self.lock().push(message);
        Ok(())
    }
}

#[async_trait]
impl StateSink for MemorySink {
    async fn persist(&self, state: &State) -> Result<()> {
        self.lock().push(Message::state(state.to_value()));
        Ok(())
    }
}
