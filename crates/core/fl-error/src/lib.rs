//! Error types and classification for the flow-log indexer.
//!
//! This crate provides:
//! - [`FlError`] - Top-level error enum for every pipeline failure
//! - Domain-specific errors ([`FetchError`], [`LineError`], [`IndexWriteError`])
//! - [`ErrorPolicy`] and [`ErrorAction`] for skip/abort decisions
//! - Classification of an error against the configured policies

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for the flow-log indexer.
#[derive(Error, Debug)]
pub enum FlError {
    /// Object download errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The fetched object is not a readable gzip stream
    #[error("Decompress error: {0}")]
    Decompress(String),

    /// A single log line could not be turned into a document
    #[error("Line error: {0}")]
    Line(#[from] LineError),

    /// The index engine rejected or never received a document
    #[error("Index write error: {0}")]
    IndexWrite(#[from] IndexWriteError),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlError {
    /// Returns the stage this error belongs to.
    pub fn stage(&self) -> Option<ProcessingStage> {
        match self {
            Self::Fetch(_) => Some(ProcessingStage::Fetch),
            Self::Decompress(_) => Some(ProcessingStage::Decompress),
            Self::Line(_) => Some(ProcessingStage::Parse),
            Self::IndexWrite(_) => Some(ProcessingStage::Index),
            Self::Config(_) | Self::Other(_) => None,
        }
    }
}

/// Errors raised while resolving an object to a local file.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Object does not exist
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Caller is not allowed to read the object
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The key cannot be mapped to a local file name
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    /// Transport or service failure during download
    #[error("Download failed: {0}")]
    Download(String),

    /// Local filesystem failure while writing the object
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors raised for a single flow-log line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// Fewer tokens than the fixed flow-log schema requires
    #[error("Malformed line: expected {expected} fields, found {found}")]
    Malformed { expected: usize, found: usize },

    /// The line is not valid UTF-8
    #[error("Invalid UTF-8 in line: {0}")]
    Encoding(String),

    /// The start field is not a usable epoch timestamp
    #[error("Invalid start timestamp '{value}': {reason}")]
    TimestampParse { value: String, reason: String },
}

/// Errors raised by the index engine write path.
#[derive(Error, Debug)]
pub enum IndexWriteError {
    /// Failed to reach the index engine
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Credentials were refused
    #[error("Authentication failed ({status}): {body}")]
    Auth { status: u16, body: String },

    /// The cluster rejected the document
    #[error("Document rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// Cluster overloaded or unavailable
    #[error("Cluster unavailable ({status}): {body}")]
    Unavailable { status: u16, body: String },

    /// The acknowledgement could not be read
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Processing stage for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Downloading the object to the scratch directory
    Fetch,

    /// Opening the gzip stream and reading lines
    Decompress,

    /// Splitting and validating a line
    Parse,

    /// Writing the document to the index engine
    Index,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch => write!(f, "Fetch"),
            Self::Decompress => write!(f, "Decompress"),
            Self::Parse => write!(f, "Parse"),
            Self::Index => write!(f, "Index"),
        }
    }
}

/// Policy for errors that only affect one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Count the failure and continue with the next line
    #[default]
    Skip,

    /// Propagate the failure and abort the invocation
    Abort,
}

impl std::str::FromStr for ErrorPolicy {
    type Err = FlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            other => Err(FlError::Config(format!(
                "Unknown error policy '{}', expected 'skip' or 'abort'",
                other
            ))),
        }
    }
}

/// What the pipeline does with a classified error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Drop the line and keep going
    Skip,

    /// Stop processing the invocation
    Abort,
}

/// Classifies an error to decide whether the current line is skipped or the
/// invocation aborts.
///
/// Only line errors and index write errors are subject to a policy; every
/// other error ends the invocation.
pub fn classify_error(
    error: &FlError,
    malformed_lines: ErrorPolicy,
    index_failures: ErrorPolicy,
) -> ErrorAction {
    let policy = match error {
        FlError::Line(_) => malformed_lines,
        FlError::IndexWrite(_) => index_failures,
        FlError::Fetch(_) | FlError::Decompress(_) | FlError::Config(_) | FlError::Other(_) => {
            ErrorPolicy::Abort
        }
    };

    match policy {
        ErrorPolicy::Skip => ErrorAction::Skip,
        ErrorPolicy::Abort => ErrorAction::Abort,
    }
}

/// Result type alias using FlError.
pub type Result<T> = std::result::Result<T, FlError>;
