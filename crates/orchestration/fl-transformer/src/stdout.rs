//! Stdout destination implementation.

use async_trait::async_trait;
use fl_error::{FlError, Result};
use fl_traits::{DocumentIndexer, IndexAck, Refresh};
use fl_types::FlowLogDocument;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::time::Instant;

/// Indexer that writes each document as one JSON line instead of sending it.
///
/// Used for dry runs and pipeline verification. The index name and refresh
/// mode are ignored.
pub struct StdoutIndexer {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl StdoutIndexer {
    /// Create an indexer writing to stdout.
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    /// Create an indexer writing to an arbitrary sink.
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl Default for StdoutIndexer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentIndexer for StdoutIndexer {
    async fn index_document(
        &self,
        _index: &str,
        document: &FlowLogDocument,
        _refresh: Refresh,
    ) -> Result<IndexAck> {
        let start = Instant::now();
        let line = serde_json::to_string(document).map_err(|e| FlError::Other(e.into()))?;

        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)
            .and_then(|_| writer.flush())
            .map_err(|e| FlError::Other(e.into()))?;

        Ok(IndexAck::new(line.len() as u64 + 1, start.elapsed()))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
