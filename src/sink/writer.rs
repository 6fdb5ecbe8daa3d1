//! Singer JSON lines writer

use super::message::{Message, RecordSink};
use crate::error::{Error, Result};
use crate::state::{State, StateSink};
use async_trait::async_trait;
use std::io::{Stdout, Write};
use std::sync::Mutex;

/// Writes one JSON message per line and flushes after each
#[derive(Debug)]
pub struct SingerWriter<W: Write + Send> {
    out: Mutex<W>,
}

impl SingerWriter<Stdout> {
    /// Writer on the process's stdout
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> SingerWriter<W> {
    /// Wrap a writer
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Unwrap the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(|_| Error::sink("Output writer poisoned"))
    }

    fn write_line(&self, message: &Message) -> Result<()> {
        let line = serde_json::to_string(message)
            .map_err(|e| Error::sink(format!("Failed to serialize message: {e}")))?;

        let mut out = self
            .out
            .lock()
            .map_err(|_| Error::sink("Output writer poisoned"))?;
        writeln!(out, "{line}")
            .and_then(|()| out.flush())
            .map_err(|e| Error::sink(format!("Failed to write message: {e}")))
    }
}

#[async_trait]
impl<W: Write + Send> RecordSink for SingerWriter<W> {
    async fn write(&self, message: Message) -> Result<()> {
        self.write_line(&message)
    }
}

#[async_trait]
impl<W: Write + Send> StateSink for SingerWriter<W> {
    async fn persist(&self, state: &State) -> Result<()> {
        self.write_line(&Message::state(state.to_value()))
            .map_err(|e| Error::state_write(e.to_string()))
    }
}
