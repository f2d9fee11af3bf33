//! Gzip line reader implementation.
//!
//! Lines are produced as raw bytes so that a line with invalid UTF-8 can be
//! rejected on its own without ending the stream. Stream-level failures
//! (bad gzip header, truncated member, corrupt deflate data) end the read.

use async_compression::tokio::bufread::GzipDecoder;
use fl_error::{FetchError, FlError, LineError, Result};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, trace};

/// Read buffer size for both the compressed and the decompressed side.
const BUFFER_CAPACITY: usize = 8192;

/// One line of a decompressed file, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 1-based line number within the file
    pub number: u64,

    /// Line bytes with `\n` / `\r\n` stripped
    pub bytes: Vec<u8>,
}

impl RawLine {
    /// Returns the line as UTF-8 text.
    pub fn text(&self) -> std::result::Result<&str, LineError> {
        std::str::from_utf8(&self.bytes).map_err(|e| LineError::Encoding(e.to_string()))
    }
}

/// Streaming line reader over a local gzip file.
///
/// # Memory Model
///
/// - Compressed side buffer: 8 KB
/// - Decompressed side buffer: 8 KB
/// - Line buffer: one line, reused across calls
///
/// Concatenated gzip members are read as one stream. The file handle is
/// released when the reader is dropped.
pub struct GzipLineReader {
    path: PathBuf,
    reader: BufReader<GzipDecoder<BufReader<File>>>,
    buffer: Vec<u8>,
    lines_read: u64,
    bytes_decompressed: u64,
}

impl GzipLineReader {
    /// Opens a gzip file for line-by-line reading.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = File::open(&path).await.map_err(|e| {
            FlError::Fetch(FetchError::Io(format!(
                "Failed to open '{}': {}",
                path.display(),
                e
            )))
        })?;

        let mut decoder = GzipDecoder::new(BufReader::with_capacity(BUFFER_CAPACITY, file));
        decoder.multiple_members(true);

        debug!(path = %path.display(), "Opened gzip file");

        Ok(Self {
            path,
            reader: BufReader::with_capacity(BUFFER_CAPACITY, decoder),
            buffer: Vec::with_capacity(256),
            lines_read: 0,
            bytes_decompressed: 0,
        })
    }

    /// Reads the next line, or `None` at end of stream.
    pub async fn next_line(&mut self) -> Result<Option<RawLine>> {
        self.buffer.clear();

        let bytes_read = self
            .reader
            .read_until(b'\n', &mut self.buffer)
            .await
            .map_err(|e| {
                FlError::Decompress(format!(
                    "Failed to read '{}' after line {}: {}",
                    self.path.display(),
                    self.lines_read,
                    e
                ))
            })?;

        if bytes_read == 0 {
            trace!(
                path = %self.path.display(),
                lines = self.lines_read,
                "Reached end of gzip stream"
            );
            return Ok(None);
        }

        self.lines_read += 1;
        self.bytes_decompressed += bytes_read as u64;

        if self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
            if self.buffer.last() == Some(&b'\r') {
                self.buffer.pop();
            }
        }

        Ok(Some(RawLine {
            number: self.lines_read,
            bytes: self.buffer.clone(),
        }))
    }

    /// Number of lines returned so far.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Number of decompressed bytes consumed so far.
    pub fn bytes_decompressed(&self) -> u64 {
        self.bytes_decompressed
    }

    /// Path of the file being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn gzip_bytes(content: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap()
    }

    fn create_gzip_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".log.gz").unwrap();
        file.write_all(&gzip_bytes(content)).unwrap();
        file.flush().unwrap();
        file
    }

    async fn read_all(path: &Path) -> Result<Vec<RawLine>> {
        let mut reader = GzipLineReader::open(path).await?;
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().await? {
            lines.push(line);
        }
        Ok(lines)
    }

    #[tokio::test]
    async fn test_reads_lines_in_order() {
        let file = create_gzip_file(b"version account-id\nline two\nline three\n");

        let lines = read_all(file.path()).await.unwrap();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[0].text().unwrap(), "version account-id");
        assert_eq!(lines[2].number, 3);
        assert_eq!(lines[2].text().unwrap(), "line three");
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let file = create_gzip_file(b"first\nsecond");

        let lines = read_all(file.path()).await.unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text().unwrap(), "second");
    }

    #[tokio::test]
    async fn test_strips_crlf() {
        let file = create_gzip_file(b"first\r\nsecond\r\n");

        let lines = read_all(file.path()).await.unwrap();

        assert_eq!(lines[0].text().unwrap(), "first");
        assert_eq!(lines[1].text().unwrap(), "second");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_a_line_error() {
        let file = create_gzip_file(b"ok\n\xff\xfe bad\nafter\n");

        let lines = read_all(file.path()).await.unwrap();

        assert_eq!(lines.len(), 3);
        assert!(matches!(lines[1].text(), Err(LineError::Encoding(_))));
        assert_eq!(lines[2].text().unwrap(), "after");
    }

    #[tokio::test]
    async fn test_concatenated_members() {
        let mut bytes = gzip_bytes(b"member one\n");
        bytes.extend(gzip_bytes(b"member two\n"));

        let mut file = NamedTempFile::with_suffix(".log.gz").unwrap();
        file.write_all(&bytes).unwrap();
        file.flush().unwrap();

        let lines = read_all(file.path()).await.unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text().unwrap(), "member two");
    }

    #[tokio::test]
    async fn test_not_gzip_is_decompress_error() {
        let mut file = NamedTempFile::with_suffix(".log.gz").unwrap();
        file.write_all(b"2 123456789012 eni-1 plain text, not gzip\n")
            .unwrap();
        file.flush().unwrap();

        let result = read_all(file.path()).await;

        assert!(matches!(result, Err(FlError::Decompress(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = GzipLineReader::open("/nonexistent/file.log.gz").await;

        assert!(matches!(result, Err(FlError::Fetch(FetchError::Io(_)))));
    }

    #[tokio::test]
    async fn test_counters() {
        let file = create_gzip_file(b"ab\ncd\n");

        let mut reader = GzipLineReader::open(file.path()).await.unwrap();
        while reader.next_line().await.unwrap().is_some() {}

        assert_eq!(reader.lines_read(), 2);
        assert_eq!(reader.bytes_decompressed(), 6);
        assert_eq!(reader.path(), file.path());
    }
}
