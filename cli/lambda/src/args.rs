//! CLI argument definitions for flowlog-indexer.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Indexes VPC flow-log files into OpenSearch as they land in S3.
///
/// Without `--event` the binary serves the Lambda runtime API and handles
/// one S3 notification per invocation. Every option can also be set through
/// its environment variable.
///
/// ## Examples
///
/// Lambda deployment (configuration from the function environment):
///   flowlog-indexer
///
/// Replay a notification against local files, printing documents:
///   flowlog-indexer --event event.json --local-root ./fixtures --dry-run
#[derive(Parser, Debug)]
#[command(name = "flowlog-indexer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    // === Index engine ===
    /// OpenSearch host name, or a full base URL
    #[arg(long, env = "OPENSEARCH_HOST")]
    pub opensearch_host: Option<String>,

    /// OpenSearch port, used when the host has no scheme
    #[arg(long, env = "OPENSEARCH_PORT", default_value = "443")]
    pub opensearch_port: u16,

    /// Basic-auth user name
    #[arg(long, env = "OPENSEARCH_USER")]
    pub opensearch_user: Option<String>,

    /// Basic-auth password
    #[arg(long, env = "OPENSEARCH_PASSWORD", hide_env_values = true)]
    pub opensearch_password: Option<String>,

    /// Target index name
    #[arg(long, env = "OPENSEARCH_INDEX")]
    pub opensearch_index: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "OPENSEARCH_TIMEOUT_SECS", default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub opensearch_timeout_secs: u64,

    /// Gzip request bodies
    #[arg(long, env = "OPENSEARCH_COMPRESS", default_value_t = true, action = ArgAction::Set)]
    pub opensearch_compress: bool,

    // === Processing ===
    /// Refresh mode sent with every write (true, wait_for, false)
    #[arg(long, env = "FLOWLOG_REFRESH", default_value = "true")]
    pub refresh: String,

    /// Source addresses whose lines are dropped
    #[arg(long, env = "FLOWLOG_EXCLUDED_ADDRESSES", value_delimiter = ',')]
    pub excluded_addresses: Vec<String>,

    /// What to do with lines that fail to parse (skip, abort)
    #[arg(long, env = "FLOWLOG_MALFORMED_LINES", default_value = "skip")]
    pub malformed_lines: String,

    /// What to do when the index engine refuses a document (skip, abort)
    #[arg(long, env = "FLOWLOG_INDEX_FAILURES", default_value = "abort")]
    pub index_failures: String,

    /// Directory fetched objects are written to (defaults to the system temp dir)
    #[arg(long, env = "FLOWLOG_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    // === AWS Configuration ===
    /// AWS region
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Custom S3 endpoint URL (for LocalStack)
    #[arg(long, env = "FLOWLOG_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    // === Local runs ===
    /// Process one notification JSON file and print the stats instead of
    /// serving the Lambda runtime API
    #[arg(long, value_name = "FILE")]
    pub event: Option<PathBuf>,

    /// Resolve objects from `<DIR>/<bucket>/<key>` instead of S3
    #[arg(long, value_name = "DIR")]
    pub local_root: Option<PathBuf>,

    /// Write documents to stdout as JSON lines instead of OpenSearch
    #[arg(long)]
    pub dry_run: bool,

    // === Logging ===
    /// Log level
    #[arg(short = 'l', long, env = "FLOWLOG_LOG_LEVEL", value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

/// Log level.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    Info,
    /// Warning level
    Warn,
    /// Error level (least verbose)
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}
