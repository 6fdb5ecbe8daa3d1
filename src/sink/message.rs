//! Message types and the record sink trait

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages emitted during a sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Schema announcement, precedes every record of the stream
    Schema {
        /// Stream name
        stream: String,
        /// JSON schema of the records
        schema: Value,
        /// Natural key fields
        key_properties: Vec<String>,
        /// Replication key fields
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        bookmark_properties: Vec<String>,
    },

    /// A single record
    Record {
        /// Stream name
        stream: String,
        /// Record data
        record: Value,
        /// When the record was read from the provider
        time_extracted: DateTime<Utc>,
    },

    /// State checkpoint
    State {
        /// Full state snapshot
        value: Value,
    },
}

impl Message {
    /// Create a schema message
    pub fn schema(
        stream: impl Into<String>,
        schema: Value,
        key_properties: Vec<String>,
        bookmark_properties: Vec<String>,
    ) -> Self {
        Self::Schema {
            stream: stream.into(),
            schema,
            key_properties,
            bookmark_properties,
        }
    }

    /// Create a record message
    pub fn record(stream: impl Into<String>, record: Value, time_extracted: DateTime<Utc>) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
            time_extracted,
        }
    }

    /// Create a state message
    pub fn state(value: Value) -> Self {
        Self::State { value }
    }

    /// Stream the message belongs to
    pub fn stream(&self) -> Option<&str> {
        match self {
            Self::Schema { stream, .. } | Self::Record { stream, .. } => Some(stream),
            Self::State { .. } => None,
        }
    }
}

/// Destination of schema and record messages
///
/// Failures are fatal for the whole run.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Write a message
    async fn write(&self, message: Message) -> Result<()>;

    /// Announce a stream's schema
    async fn write_schema(
        &self,
        stream: &str,
        schema: &Value,
        key_properties: &[String],
        bookmark_properties: &[String],
    ) -> Result<()> {
        self.write(Message::schema(
            stream,
            schema.clone(),
            key_properties.to_vec(),
            bookmark_properties.to_vec(),
        ))
        .await
    }

    /// Emit one record
    async fn write_record(
        &self,
        stream: &str,
        record: Value,
        time_extracted: DateTime<Utc>,
    ) -> Result<()> {
        self.write(Message::record(stream, record, time_extracted))
            .await
    }
}
