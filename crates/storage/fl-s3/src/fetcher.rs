//! S3 object fetcher.

use crate::client::{S3Config, create_s3_client};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use fl_error::{FetchError, FlError, Result};
use fl_traits::{ObjectFetcher, local_path_for};
use fl_types::{LocalObject, ObjectLocation};
use std::path::Path;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Fetcher that downloads objects with `GetObject`.
///
/// The response body is streamed straight to the scratch file, so memory use
/// does not grow with object size. The client is created once per process and
/// reused for every invocation.
#[derive(Clone)]
pub struct S3Fetcher {
    client: Client,
}

impl S3Fetcher {
    /// Create a fetcher around an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a fetcher from configuration.
    pub async fn from_config(config: &S3Config) -> Result<Self> {
        let client = create_s3_client(config).await?;
        Ok(Self::new(client))
    }

    /// Access the underlying SDK client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ObjectFetcher for S3Fetcher {
    async fn fetch(&self, location: &ObjectLocation, scratch_dir: &Path) -> Result<LocalObject> {
        let start = Instant::now();
        let path = local_path_for(location, scratch_dir)?;

        debug!(object = %location, path = %path.display(), "Downloading object from S3");

        let output = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| map_get_object_error(location, e))?;

        tokio::fs::create_dir_all(scratch_dir)
            .await
            .map_err(|e| io_error(scratch_dir, e))?;

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| io_error(&path, e))?;

        // Owned from here on so a partial download is removed on error
        let object = LocalObject::new(location.clone(), &path, 0);

        let mut body = output.body.into_async_read();
        let size = tokio::io::copy(&mut body, &mut file).await.map_err(|e| {
            FlError::Fetch(FetchError::Download(format!(
                "Failed to stream body of {}: {}",
                location, e
            )))
        })?;
        file.flush().await.map_err(|e| io_error(&path, e))?;

        info!(
            object = %location,
            bytes = size,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Downloaded object"
        );

        Ok(object.with_size_bytes(size))
    }
}

fn map_get_object_error(location: &ObjectLocation, error: SdkError<GetObjectError>) -> FlError {
    let service_error = error.into_service_error();

    let fetch_error = if service_error.is_no_such_key() {
        FetchError::NotFound(location.to_string())
    } else if matches!(service_error.code(), Some("AccessDenied") | Some("Forbidden")) {
        FetchError::AccessDenied(location.to_string())
    } else {
        FetchError::Download(format!(
            "Failed to download {}: {}",
            location,
            DisplayErrorContext(&service_error)
        ))
    };

    FlError::Fetch(fetch_error)
}

fn io_error(path: &Path, error: std::io::Error) -> FlError {
    FlError::Fetch(FetchError::Io(format!(
        "Failed to write '{}': {}",
        path.display(),
        error
    )))
}
