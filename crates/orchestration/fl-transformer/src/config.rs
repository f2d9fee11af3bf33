//! Configuration types for the transformer.

use chrono::FixedOffset;
use fl_error::{ErrorPolicy, FlError, Result};
use fl_traits::Refresh;
use fl_types::DEFAULT_UTC_OFFSET_SECS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Configuration for a transformer instance.
///
/// Read once at process start and shared by every invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformerConfig {
    /// Target index name
    pub index: String,

    /// Refresh mode requested with every write
    pub refresh: Refresh,

    /// Source addresses whose lines are dropped
    pub excluded_addresses: BTreeSet<String>,

    /// What happens to lines that fail to parse
    pub malformed_lines: ErrorPolicy,

    /// What happens when the index engine refuses a document
    pub index_failures: ErrorPolicy,

    /// Directory fetched objects are written to
    pub scratch_dir: PathBuf,

    /// Offset from UTC of the `date` field, in seconds
    pub utc_offset_secs: i32,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            index: String::new(),
            refresh: Refresh::True,
            excluded_addresses: BTreeSet::new(),
            malformed_lines: ErrorPolicy::Skip,
            index_failures: ErrorPolicy::Abort,
            scratch_dir: std::env::temp_dir(),
            utc_offset_secs: DEFAULT_UTC_OFFSET_SECS,
        }
    }
}

impl TransformerConfig {
    /// Create a configuration writing to `index` with defaults.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            ..Default::default()
        }
    }

    /// Set the refresh mode.
    pub fn with_refresh(mut self, refresh: Refresh) -> Self {
        self.refresh = refresh;
        self
    }

    /// Add source addresses to drop.
    ///
    /// Blank entries are ignored.
    pub fn with_excluded_addresses<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_addresses.extend(
            addresses
                .into_iter()
                .map(|a| {
                    let a: String = a.into();
                    a.trim().to_string()
                })
                .filter(|a| !a.is_empty()),
        );
        self
    }

    /// Set the policy for malformed lines.
    pub fn with_malformed_lines(mut self, policy: ErrorPolicy) -> Self {
        self.malformed_lines = policy;
        self
    }

    /// Set the policy for index write failures.
    pub fn with_index_failures(mut self, policy: ErrorPolicy) -> Self {
        self.index_failures = policy;
        self
    }

    /// Set the scratch directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Set the offset of the `date` field from UTC, in seconds.
    pub fn with_utc_offset_secs(mut self, secs: i32) -> Self {
        self.utc_offset_secs = secs;
        self
    }

    /// Offset the `date` field is rendered in.
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_secs).ok_or_else(|| {
            FlError::Config(format!(
                "UTC offset of {} seconds is out of range",
                self.utc_offset_secs
            ))
        })
    }

    /// Checks the configuration before the first invocation.
    pub fn validate(&self) -> Result<()> {
        if self.index.trim().is_empty() {
            return Err(FlError::Config("Target index name is empty".to_string()));
        }
        if self.index.starts_with('_') || self.index.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(FlError::Config(format!(
                "Invalid index name '{}': must be lowercase and must not start with '_'",
                self.index
            )));
        }
        self.utc_offset()?;
        Ok(())
    }
}
