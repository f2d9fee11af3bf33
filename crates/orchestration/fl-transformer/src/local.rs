//! Local directory fetcher.

use async_trait::async_trait;
use fl_error::{FetchError, FlError, Result};
use fl_traits::{ObjectFetcher, local_path_for};
use fl_types::{LocalObject, ObjectLocation};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Fetcher that resolves objects from a directory laid out as
/// `<root>/<bucket>/<key>`.
///
/// Used for local runs and tests in place of S3.
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    root: PathBuf,
}

impl LocalFetcher {
    /// Create a fetcher reading below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path the object is read from.
    fn source_path(&self, location: &ObjectLocation) -> Result<PathBuf> {
        let relative = Path::new(&location.bucket).join(&location.key);

        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(FlError::Fetch(FetchError::InvalidKey(format!(
                "'{}' escapes the local root",
                location
            ))));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectFetcher for LocalFetcher {
    async fn fetch(&self, location: &ObjectLocation, scratch_dir: &Path) -> Result<LocalObject> {
        let source = self.source_path(location)?;
        let target = local_path_for(location, scratch_dir)?;

        tokio::fs::create_dir_all(scratch_dir).await.map_err(|e| {
            FlError::Fetch(FetchError::Io(format!(
                "Failed to create '{}': {}",
                scratch_dir.display(),
                e
            )))
        })?;

        let size = tokio::fs::copy(&source, &target).await.map_err(|e| {
            let error = match e.kind() {
                std::io::ErrorKind::NotFound => FetchError::NotFound(location.to_string()),
                std::io::ErrorKind::PermissionDenied => {
                    FetchError::AccessDenied(location.to_string())
                }
                _ => FetchError::Io(format!(
                    "Failed to copy '{}' to '{}': {}",
                    source.display(),
                    target.display(),
                    e
                )),
            };
            FlError::Fetch(error)
        })?;

        debug!(object = %location, path = %target.display(), bytes = size, "Copied local object");

        Ok(LocalObject::new(location.clone(), target, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_copies_into_scratch_dir() {
        let root = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let source_dir = root.path().join("bucket/AWSLogs/2023");
        std::fs::create_dir_all(&source_dir).unwrap();
        std::fs::write(source_dir.join("file.log.gz"), b"bytes").unwrap();

        let fetcher = LocalFetcher::new(root.path());
        let object = fetcher
            .fetch(
                &ObjectLocation::new("bucket", "AWSLogs/2023/file.log.gz"),
                scratch.path(),
            )
            .await
            .unwrap();

        assert_eq!(object.path(), scratch.path().join("file.log.gz"));
        assert_eq!(object.size_bytes(), 5);
        assert!(source_dir.join("file.log.gz").exists());
    }

    #[tokio::test]
    async fn test_fetch_missing_object() {
        let root = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();

        let result = LocalFetcher::new(root.path())
            .fetch(&ObjectLocation::new("bucket", "missing.gz"), scratch.path())
            .await;

        assert!(matches!(
            result,
            Err(FlError::Fetch(FetchError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_fetch_rejects_parent_components() {
        let root = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();

        let result = LocalFetcher::new(root.path())
            .fetch(&ObjectLocation::new("bucket", "../secret.gz"), scratch.path())
            .await;

        assert!(matches!(
            result,
            Err(FlError::Fetch(FetchError::InvalidKey(_)))
        ));
    }
}
