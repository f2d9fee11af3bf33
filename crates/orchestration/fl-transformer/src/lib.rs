//! fl-transformer - Turns notified flow-log files into indexed documents.
//!
//! This crate provides the per-invocation pipeline:
//!
//! - Fetch every notified object into a scratch directory
//! - Decompress and read it line by line
//! - Apply the header / excluded-address / shape rules to each line
//! - Index one document per accepted line with the requested refresh
//!
//! # Example
//!
//! ```ignore
//! use fl_transformer::{FlowLogTransformer, TransformerConfig};
//!
//! let config = TransformerConfig::new("vpc-flow-logs")
//!     .with_excluded_addresses(["10.0.0.14"]);
//! let transformer = FlowLogTransformer::new(config, fetcher, indexer)?;
//!
//! let stats = transformer.process(&event).await?;
//! eprintln!("Indexed {} documents", stats.documents_indexed);
//! ```

pub mod config;
pub mod line;
pub mod local;
pub mod stats;
pub mod stdout;
pub mod transformer;

pub use config::TransformerConfig;
pub use line::{LineOutcome, LineTransformer, SkipReason};
pub use local::LocalFetcher;
pub use stats::InvocationStats;
pub use stdout::StdoutIndexer;
pub use transformer::FlowLogTransformer;
