//! Scoped handle to a fetched object on local disk.

use crate::ObjectLocation;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A fetched object written to the scratch directory.
///
/// The file is deleted when the handle is dropped, whether processing of the
/// object succeeded or not.
#[derive(Debug)]
pub struct LocalObject {
    location: ObjectLocation,
    path: PathBuf,
    size_bytes: u64,
}

impl LocalObject {
    /// Takes ownership of a file that now holds the object's bytes.
    pub fn new(location: ObjectLocation, path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            location,
            path: path.into(),
            size_bytes,
        }
    }

    /// Sets the size once the bytes are fully written.
    pub fn with_size_bytes(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    /// Location the bytes were fetched from.
    pub fn location(&self) -> &ObjectLocation {
        &self.location
    }

    /// Local path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of bytes written.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

impl Drop for LocalObject {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed local object"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove local object"
            ),
        }
    }
}
