//! Statistics for one invocation.

use crate::line::SkipReason;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Counters collected while processing one notification.
///
/// Returned to the host as the invocation result. Lines are processed
/// sequentially, so plain counters are enough.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationStats {
    /// When processing started
    pub started_at: DateTime<Utc>,

    /// When processing completed
    pub completed_at: Option<DateTime<Utc>>,

    /// Objects fully read
    pub objects_processed: u64,

    /// Compressed bytes downloaded
    pub bytes_downloaded: u64,

    /// Lines read across all objects
    pub lines_read: u64,

    /// Documents acknowledged by the index engine
    pub documents_indexed: u64,

    /// Bytes sent to the index engine
    pub bytes_indexed: u64,

    /// Header lines skipped
    pub skipped_headers: u64,

    /// Lines skipped for an excluded source address
    pub skipped_excluded: u64,

    /// Blank lines skipped
    pub skipped_blank: u64,

    /// Lines dropped because they could not be parsed
    pub malformed_lines: u64,

    /// Documents the index engine refused
    pub index_failures: u64,
}

impl Default for InvocationStats {
    fn default() -> Self {
        Self::new()
    }
}

impl InvocationStats {
    /// Create a new stats tracker with the current time as start time.
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            completed_at: None,
            objects_processed: 0,
            bytes_downloaded: 0,
            lines_read: 0,
            documents_indexed: 0,
            bytes_indexed: 0,
            skipped_headers: 0,
            skipped_excluded: 0,
            skipped_blank: 0,
            malformed_lines: 0,
            index_failures: 0,
        }
    }

    /// Mark processing as complete with the current time.
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Record a downloaded object.
    pub fn record_download(&mut self, bytes: u64) {
        self.bytes_downloaded += bytes;
    }

    /// Record an object read to the end.
    pub fn record_object(&mut self) {
        self.objects_processed += 1;
    }

    /// Record a line read from an object.
    pub fn record_line(&mut self) {
        self.lines_read += 1;
    }

    /// Record a skipped line.
    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Blank => self.skipped_blank += 1,
            SkipReason::Header => self.skipped_headers += 1,
            SkipReason::ExcludedAddress => self.skipped_excluded += 1,
        }
    }

    /// Record a line dropped as malformed.
    pub fn record_malformed(&mut self) {
        self.malformed_lines += 1;
    }

    /// Record an indexed document.
    pub fn record_indexed(&mut self, bytes_sent: u64) {
        self.documents_indexed += 1;
        self.bytes_indexed += bytes_sent;
    }

    /// Record a document the index engine refused.
    pub fn record_index_failure(&mut self) {
        self.index_failures += 1;
    }

    /// Lines that produced no document for any reason.
    pub fn lines_skipped(&self) -> u64 {
        self.skipped_headers
            + self.skipped_excluded
            + self.skipped_blank
            + self.malformed_lines
            + self.index_failures
    }

    /// Get the duration of the invocation.
    pub fn duration(&self) -> Duration {
        self.completed_at.unwrap_or_else(Utc::now) - self.started_at
    }
}
