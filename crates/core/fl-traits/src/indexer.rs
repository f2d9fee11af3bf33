//! Document indexer trait and related types.

use async_trait::async_trait;
use fl_error::Result;
use fl_types::FlowLogDocument;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Trait for document indexers.
///
/// Indexers write a single document per call. The pipeline awaits each call
/// before reading the next line.
///
/// # Implementations
///
/// - OpenSearch indexer: `POST /{index}/_doc` over HTTPS
/// - Stdout indexer: JSON lines for dry runs
#[async_trait]
pub trait DocumentIndexer: Send + Sync {
    /// Indexes one document.
    ///
    /// # Arguments
    ///
    /// * `index` - Target index name
    /// * `document` - Document body
    /// * `refresh` - Visibility requested for the write
    async fn index_document(
        &self,
        index: &str,
        document: &FlowLogDocument,
        refresh: Refresh,
    ) -> Result<IndexAck>;

    /// Checks if the indexer is reachable and accepts requests.
    async fn health_check(&self) -> Result<bool>;
}

/// Refresh mode requested with a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Refresh {
    /// Refresh the affected shards immediately
    #[default]
    True,

    /// Wait until a scheduled refresh makes the write visible
    WaitFor,

    /// Do not refresh
    False,
}

impl Refresh {
    /// Value of the `refresh` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::WaitFor => "wait_for",
            Self::False => "false",
        }
    }
}

impl std::str::FromStr for Refresh {
    type Err = fl_error::FlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Self::True),
            "wait_for" => Ok(Self::WaitFor),
            "false" => Ok(Self::False),
            other => Err(fl_error::FlError::Config(format!(
                "Unknown refresh mode '{}', expected 'true', 'wait_for' or 'false'",
                other
            ))),
        }
    }
}

/// Acknowledgement returned for an indexed document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexAck {
    /// Index the document landed in
    pub index: Option<String>,

    /// Document ID assigned by the engine
    pub id: Option<String>,

    /// Outcome reported by the engine (e.g., "created")
    pub result: Option<String>,

    /// Bytes sent on the wire
    pub bytes_sent: u64,

    /// Time taken for the call
    #[serde(skip)]
    pub duration: Duration,
}

impl IndexAck {
    /// Creates an acknowledgement for a write of `bytes` bytes.
    pub fn new(bytes_sent: u64, duration: Duration) -> Self {
        Self {
            bytes_sent,
            duration,
            ..Default::default()
        }
    }

    /// Sets the engine-reported identity of the write.
    pub fn with_identity(
        mut self,
        index: Option<String>,
        id: Option<String>,
        result: Option<String>,
    ) -> Self {
        self.index = index;
        self.id = id;
        self.result = result;
        self
    }
}
