//! Core traits for the flow-log indexer.
//!
//! This crate defines the seams between the pipeline and its collaborators:
//! - [`ObjectFetcher`] - Resolves a notified object to a local file (S3, local directory)
//! - [`DocumentIndexer`] - Writes one document to an index (OpenSearch, stdout)

pub mod fetcher;
pub mod indexer;

pub use fetcher::*;
pub use indexer::*;
