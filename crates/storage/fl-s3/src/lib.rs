//! S3 access for the flow-log indexer.
//!
//! This crate provides:
//! - [`S3Config`] / [`create_s3_client`] - SDK client construction
//! - [`S3Fetcher`] - [`fl_traits::ObjectFetcher`] that streams `GetObject` bodies to disk

mod client;
mod fetcher;

pub use client::{S3Config, create_s3_client};
pub use fetcher::S3Fetcher;
