//! Gzip line reader for flow-log files.
//!
//! This crate provides a streaming reader that decompresses a local gzip file
//! and yields its lines one at a time with bounded memory.
//!
//! # Example
//!
//! ```ignore
//! use fl_reader_gzip::GzipLineReader;
//!
//! let mut reader = GzipLineReader::open("/tmp/file.log.gz").await?;
//! while let Some(line) = reader.next_line().await? {
//!     println!("{}: {}", line.number, line.text()?);
//! }
//! ```

mod reader;

pub use reader::{GzipLineReader, RawLine};
