//! OpenSearch `_doc` indexer.

use crate::config::OpenSearchConfig;
use async_trait::async_trait;
use fl_error::{FlError, IndexWriteError, Result};
use fl_traits::{DocumentIndexer, IndexAck, Refresh};
use fl_types::FlowLogDocument;
use flate2::Compression;
use flate2::write::GzEncoder;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use serde::Deserialize;
use std::io::Write;
use std::time::Instant;
use tracing::{trace, warn};

/// Indexer that writes one document per request to OpenSearch.
///
/// The HTTP client keeps its connection pool between calls, so a warm
/// process reuses connections across invocations.
pub struct OpenSearchIndexer {
    client: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    compress_requests: bool,
}

/// Subset of the `_doc` response used for the acknowledgement.
#[derive(Debug, Deserialize)]
struct DocResponse {
    #[serde(rename = "_index")]
    index: Option<String>,
    #[serde(rename = "_id")]
    id: Option<String>,
    result: Option<String>,
}

impl OpenSearchIndexer {
    /// Create an indexer from configuration.
    pub fn new(config: &OpenSearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FlError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            username: config.username.clone(),
            password: config.password.clone(),
            compress_requests: config.compress_requests,
        })
    }

    /// URL of the `_doc` endpoint for `index`.
    fn doc_url(&self, index: &str, refresh: Refresh) -> String {
        format!(
            "{}/{}/_doc?refresh={}",
            self.base_url,
            urlencoding::encode(index),
            refresh.as_param()
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.username {
            Some(username) => request.basic_auth(username, self.password.as_deref()),
            None => request,
        }
    }
}

#[async_trait]
impl DocumentIndexer for OpenSearchIndexer {
    async fn index_document(
        &self,
        index: &str,
        document: &FlowLogDocument,
        refresh: Refresh,
    ) -> Result<IndexAck> {
        let start = Instant::now();
        let url = self.doc_url(index, refresh);

        let json = serde_json::to_vec(document)
            .map_err(|e| anyhow::anyhow!("Failed to serialize document: {}", e))?;

        let mut request = self
            .authorize(self.client.post(&url))
            .header(CONTENT_TYPE, "application/json");

        let body = if self.compress_requests {
            request = request.header(CONTENT_ENCODING, "gzip");
            gzip(&json)?
        } else {
            json
        };
        let bytes_sent = body.len() as u64;

        trace!(url = %url, bytes = bytes_sent, "Sending document");

        let response = request.body(body).send().await.map_err(|e| {
            IndexWriteError::Connection(format!("Request to {} failed: {}", self.base_url, e))
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            IndexWriteError::InvalidResponse(format!("Failed to read response body: {}", e))
        })?;

        if !(200..300).contains(&status) {
            warn!(status, index, "Index engine refused document");
            return Err(classify_status(status, text).into());
        }

        let ack = parse_ack(&text, bytes_sent, start)?;

        trace!(
            index = ack.index.as_deref().unwrap_or(index),
            id = ack.id.as_deref().unwrap_or("-"),
            result = ack.result.as_deref().unwrap_or("-"),
            elapsed_ms = ack.duration.as_millis() as u64,
            "Received acknowledgement"
        );

        Ok(ack)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/_cluster/health", self.base_url);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                IndexWriteError::Connection(format!("Request to {} failed: {}", self.base_url, e))
            })?;

        Ok(response.status().is_success())
    }
}

/// Maps a non-success status to an index write error.
fn classify_status(status: u16, body: String) -> IndexWriteError {
    match status {
        401 | 403 => IndexWriteError::Auth { status, body },
        429 | 502 | 503 | 504 => IndexWriteError::Unavailable { status, body },
        _ => IndexWriteError::Rejected { status, body },
    }
}

fn parse_ack(text: &str, bytes_sent: u64, start: Instant) -> Result<IndexAck> {
    let response: DocResponse = serde_json::from_str(text).map_err(|e| {
        IndexWriteError::InvalidResponse(format!("Unexpected acknowledgement '{}': {}", text, e))
    })?;

    Ok(IndexAck::new(bytes_sent, start.elapsed()).with_identity(
        response.index,
        response.id,
        response.result,
    ))
}

fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::fast());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| anyhow::anyhow!("Failed to compress request body: {}", e).into())
}
