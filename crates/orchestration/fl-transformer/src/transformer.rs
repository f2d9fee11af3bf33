//! Per-notification pipeline.

use crate::config::TransformerConfig;
use crate::line::{LineOutcome, LineTransformer};
use crate::stats::InvocationStats;
use fl_error::{ErrorAction, FlError, Result, classify_error};
use fl_reader_gzip::{GzipLineReader, RawLine};
use fl_traits::{DocumentIndexer, ObjectFetcher};
use fl_types::{NotificationEvent, ObjectLocation};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// Turns every object named in a notification into indexed documents.
///
/// Objects are processed in notification order and lines in file order.
/// Each document write is awaited before the next line is read, so
/// documents reach the index in source order.
///
/// One instance is built at process start and reused across invocations.
pub struct FlowLogTransformer {
    config: TransformerConfig,
    lines: LineTransformer,
    fetcher: Arc<dyn ObjectFetcher>,
    indexer: Arc<dyn DocumentIndexer>,
}

impl FlowLogTransformer {
    /// Create a transformer after validating `config`.
    pub fn new(
        config: TransformerConfig,
        fetcher: Arc<dyn ObjectFetcher>,
        indexer: Arc<dyn DocumentIndexer>,
    ) -> Result<Self> {
        config.validate()?;
        let lines = LineTransformer::new(config.excluded_addresses.iter().cloned(), config.utc_offset()?);

        Ok(Self {
            config,
            lines,
            fetcher,
            indexer,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &TransformerConfig {
        &self.config
    }

    /// Get the indexer.
    pub fn indexer(&self) -> &Arc<dyn DocumentIndexer> {
        &self.indexer
    }

    /// Processes every object named in `event`.
    ///
    /// Returns the invocation counters, or the first error whose policy is
    /// abort. Documents indexed before an abort stay indexed.
    pub async fn process(&self, event: &NotificationEvent) -> Result<InvocationStats> {
        let start = Instant::now();
        let mut stats = InvocationStats::new();

        let locations = event.locations().inspect_err(|e| {
            error!(error = %e, "Failed to read notification");
        })?;

        if locations.is_empty() {
            warn!("Notification contains no object records");
        }

        for location in &locations {
            if let Err(e) = self.process_object(location, &mut stats).await {
                error!(
                    object = %location,
                    stage = ?e.stage(),
                    error = %e,
                    documents_indexed = stats.documents_indexed,
                    "Invocation aborted"
                );
                return Err(e);
            }
        }

        stats.complete();

        info!(
            objects = stats.objects_processed,
            lines = stats.lines_read,
            indexed = stats.documents_indexed,
            skipped = stats.lines_skipped(),
            duration_ms = start.elapsed().as_millis(),
            "Invocation complete"
        );

        Ok(stats)
    }

    /// Fetches one object and indexes its lines.
    ///
    /// The local copy is removed when this returns, on success or failure.
    async fn process_object(
        &self,
        location: &ObjectLocation,
        stats: &mut InvocationStats,
    ) -> Result<()> {
        let start = Instant::now();
        debug!(object = %location, "Processing object");

        let object = self
            .fetcher
            .fetch(location, &self.config.scratch_dir)
            .await?;
        stats.record_download(object.size_bytes());

        let mut reader = GzipLineReader::open(object.path()).await?;
        let indexed_before = stats.documents_indexed;

        while let Some(line) = reader.next_line().await? {
            stats.record_line();
            self.handle_line(location, &line, stats).await?;
        }

        stats.record_object();

        info!(
            object = %location,
            lines = reader.lines_read(),
            bytes_decompressed = reader.bytes_decompressed(),
            indexed = stats.documents_indexed - indexed_before,
            duration_ms = start.elapsed().as_millis(),
            "Object processed"
        );

        Ok(())
    }

    /// Transforms and indexes one line, applying the error policies.
    async fn handle_line(
        &self,
        location: &ObjectLocation,
        line: &RawLine,
        stats: &mut InvocationStats,
    ) -> Result<()> {
        let outcome = match line.text().and_then(|text| self.lines.transform(text)) {
            Ok(outcome) => outcome,
            Err(e) => {
                let e = FlError::Line(e);
                return match self.classify(&e) {
                    ErrorAction::Skip => {
                        warn!(object = %location, line = line.number, error = %e, "Skipping malformed line");
                        stats.record_malformed();
                        Ok(())
                    }
                    ErrorAction::Abort => Err(e),
                };
            }
        };

        let document = match outcome {
            LineOutcome::Document(document) => document,
            LineOutcome::Skipped(reason) => {
                trace!(object = %location, line = line.number, ?reason, "Skipped line");
                stats.record_skip(reason);
                return Ok(());
            }
        };

        match self
            .indexer
            .index_document(&self.config.index, &document, self.config.refresh)
            .await
        {
            Ok(ack) => {
                debug!(
                    object = %location,
                    line = line.number,
                    index = ack.index.as_deref().unwrap_or(&self.config.index),
                    id = ack.id.as_deref().unwrap_or("-"),
                    result = ack.result.as_deref().unwrap_or("-"),
                    duration_ms = ack.duration.as_millis(),
                    "Indexed document"
                );
                stats.record_indexed(ack.bytes_sent);
                Ok(())
            }
            Err(e) => match self.classify(&e) {
                ErrorAction::Skip => {
                    warn!(object = %location, line = line.number, error = %e, "Skipping document the index refused");
                    stats.record_index_failure();
                    Ok(())
                }
                ErrorAction::Abort => Err(e),
            },
        }
    }

    fn classify(&self, error: &FlError) -> ErrorAction {
        classify_error(
            error,
            self.config.malformed_lines,
            self.config.index_failures,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalFetcher;
    use async_trait::async_trait;
    use fl_error::{ErrorPolicy, IndexWriteError};
    use fl_traits::{IndexAck, Refresh};
    use fl_types::FlowLogDocument;
    use parking_lot::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingIndexer {
        calls: Mutex<u64>,
        fail: bool,
    }

    #[async_trait]
    impl DocumentIndexer for CountingIndexer {
        async fn index_document(
            &self,
            _index: &str,
            _document: &FlowLogDocument,
            _refresh: Refresh,
        ) -> Result<IndexAck> {
            *self.calls.lock() += 1;
            if self.fail {
                return Err(IndexWriteError::Rejected {
                    status: 400,
                    body: "mapper_parsing_exception".to_string(),
                }
                .into());
            }
            Ok(IndexAck::new(10, Duration::from_millis(1)))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn transformer(config: TransformerConfig, indexer: Arc<CountingIndexer>) -> FlowLogTransformer {
        FlowLogTransformer::new(config, Arc::new(LocalFetcher::new("/nonexistent")), indexer).unwrap()
    }

    fn raw(text: &str) -> RawLine {
        RawLine {
            number: 1,
            bytes: text.as_bytes().to_vec(),
        }
    }

    const VALID: &str = "2 123456789012 eni-1 10.0.1.5 10.0.1.6 1 2 6 1 40 1700000000 1700000001 ACCEPT OK";

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = FlowLogTransformer::new(
            TransformerConfig::default(),
            Arc::new(LocalFetcher::new("/nonexistent")),
            Arc::new(CountingIndexer::default()),
        );
        assert!(matches!(result, Err(FlError::Config(_))));
    }

    #[tokio::test]
    async fn test_handle_line_indexes_valid_line() {
        let indexer = Arc::new(CountingIndexer::default());
        let t = transformer(TransformerConfig::new("idx"), Arc::clone(&indexer));
        let mut stats = InvocationStats::new();

        t.handle_line(&ObjectLocation::new("b", "k"), &raw(VALID), &mut stats)
            .await
            .unwrap();

        assert_eq!(*indexer.calls.lock(), 1);
        assert_eq!(stats.documents_indexed, 1);
        assert_eq!(stats.bytes_indexed, 10);
    }

    #[tokio::test]
    async fn test_handle_line_invalid_utf8_follows_policy() {
        let indexer = Arc::new(CountingIndexer::default());
        let line = RawLine {
            number: 3,
            bytes: vec![b'2', b' ', 0xff, 0xfe],
        };
        let location = ObjectLocation::new("b", "k");

        let skip = transformer(TransformerConfig::new("idx"), Arc::clone(&indexer));
        let mut stats = InvocationStats::new();
        skip.handle_line(&location, &line, &mut stats).await.unwrap();
        assert_eq!(stats.malformed_lines, 1);

        let abort = transformer(
            TransformerConfig::new("idx").with_malformed_lines(ErrorPolicy::Abort),
            Arc::clone(&indexer),
        );
        let err = abort
            .handle_line(&location, &line, &mut InvocationStats::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FlError::Line(_)));
        assert_eq!(*indexer.calls.lock(), 0);
    }

    #[tokio::test]
    async fn test_handle_line_index_failure_follows_policy() {
        let indexer = Arc::new(CountingIndexer {
            fail: true,
            ..Default::default()
        });
        let location = ObjectLocation::new("b", "k");

        let abort = transformer(TransformerConfig::new("idx"), Arc::clone(&indexer));
        let err = abort
            .handle_line(&location, &raw(VALID), &mut InvocationStats::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FlError::IndexWrite(_)));

        let skip = transformer(
            TransformerConfig::new("idx").with_index_failures(ErrorPolicy::Skip),
            Arc::clone(&indexer),
        );
        let mut stats = InvocationStats::new();
        skip.handle_line(&location, &raw(VALID), &mut stats).await.unwrap();
        assert_eq!(stats.index_failures, 1);
        assert_eq!(stats.documents_indexed, 0);
    }

    #[tokio::test]
    async fn test_process_empty_notification() {
        let indexer = Arc::new(CountingIndexer::default());
        let t = transformer(TransformerConfig::new("idx"), Arc::clone(&indexer));

        let stats = t
            .process(&NotificationEvent::from_objects(Vec::<(String, String)>::new()))
            .await
            .unwrap();

        assert_eq!(stats.objects_processed, 0);
        assert!(stats.completed_at.is_some());
    }
}
