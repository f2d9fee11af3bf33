//! Core types for the flow-log indexer.
//!
//! This crate provides the foundational types used throughout the system:
//! - [`NotificationEvent`] - Object-creation notification naming the files to process
//! - [`ObjectLocation`] - A decoded (bucket, key) pair
//! - [`FlowLogRecord`] / [`FlowLogDocument`] - One parsed line and the document indexed for it
//! - [`LocalObject`] - A fetched file that is removed when dropped

pub mod event;
pub mod local_object;
pub mod record;

pub use event::*;
pub use local_object::*;
pub use record::*;
