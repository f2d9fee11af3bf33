//! OpenSearch indexer for flow-log documents.
//!
//! Documents are written one at a time to the `_doc` endpoint of the target
//! index with HTTP basic auth over verified TLS.
//!
//! # Example
//!
//! ```ignore
//! use fl_opensearch::{OpenSearchConfig, OpenSearchIndexer};
//! use fl_traits::{DocumentIndexer, Refresh};
//!
//! let config = OpenSearchConfig::new("search-domain.ap-southeast-1.es.amazonaws.com")
//!     .with_credentials("admin", "secret");
//! let indexer = OpenSearchIndexer::new(&config)?;
//! let ack = indexer.index_document("vpc-flow-logs", &document, Refresh::True).await?;
//! ```

mod config;
mod indexer;

pub use config::OpenSearchConfig;
pub use indexer::OpenSearchIndexer;
