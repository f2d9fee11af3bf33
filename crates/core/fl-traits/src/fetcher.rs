//! Object fetcher trait.

use async_trait::async_trait;
use fl_error::{FetchError, Result};
use fl_types::{LocalObject, ObjectLocation};
use std::path::{Path, PathBuf};

/// Trait for object fetchers.
///
/// Fetchers download the bytes of a notified object into a file inside the
/// scratch directory and hand back a [`LocalObject`] that removes the file
/// when dropped.
///
/// # Implementations
///
/// - S3 fetcher: `GetObject` streamed to disk
/// - Local fetcher: copies from a directory tree laid out as `<root>/<bucket>/<key>`
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// Fetches an object into `scratch_dir`.
    ///
    /// # Arguments
    ///
    /// * `location` - Bucket and decoded key of the object
    /// * `scratch_dir` - Directory the local file is created in
    async fn fetch(&self, location: &ObjectLocation, scratch_dir: &Path) -> Result<LocalObject>;
}

/// Returns the local path an object is written to: the last segment of its
/// key inside `scratch_dir`.
pub fn local_path_for(location: &ObjectLocation, scratch_dir: &Path) -> Result<PathBuf> {
    let file_name = location.file_name().ok_or_else(|| {
        FetchError::InvalidKey(format!("No file name in key '{}'", location.key))
    })?;

    Ok(scratch_dir.join(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_error::FlError;

    #[test]
    fn test_local_path_uses_last_key_segment() {
        let location = ObjectLocation::new("bucket", "AWSLogs/123/vpcflowlogs/file.log.gz");
        let path = local_path_for(&location, Path::new("/tmp")).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/file.log.gz"));
    }

    #[test]
    fn test_local_path_rejects_directory_key() {
        let location = ObjectLocation::new("bucket", "AWSLogs/123/");
        let result = local_path_for(&location, Path::new("/tmp"));
        assert!(matches!(
            result,
            Err(FlError::Fetch(FetchError::InvalidKey(_)))
        ));
    }
}
