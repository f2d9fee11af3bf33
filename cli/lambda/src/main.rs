//! flowlog-indexer CLI
//!
//! Indexes VPC flow-log files into OpenSearch, as a Lambda function or as a
//! local one-shot run.

use anyhow::{Context, Result};
use clap::Parser;
use fl_opensearch::OpenSearchIndexer;
use fl_s3::S3Fetcher;
use fl_traits::{DocumentIndexer, ObjectFetcher};
use fl_transformer::{FlowLogTransformer, LocalFetcher, StdoutIndexer};
use fl_types::NotificationEvent;
use lambda_runtime::service_fn;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

mod args;
mod config;
mod handler;
mod logging;

use args::Cli;
use config::{AppConfig, IndexTarget, ObjectSource};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize logging (to stderr, so stdout is clean for output)
    logging::init_logging(args.log_level)?;

    let config = AppConfig::from_cli(&args)?;
    let transformer = Arc::new(build_transformer(config).await?);

    match args.event {
        Some(ref path) => run_once(&transformer, path).await,
        None => run_lambda(transformer).await,
    }
}

/// Builds the transformer and its fetcher and indexer.
async fn build_transformer(config: AppConfig) -> Result<FlowLogTransformer> {
    let fetcher: Arc<dyn ObjectFetcher> = match config.source {
        ObjectSource::S3(ref s3) => Arc::new(S3Fetcher::from_config(s3).await?),
        ObjectSource::Local(ref root) => Arc::new(LocalFetcher::new(root)),
    };

    let indexer: Arc<dyn DocumentIndexer> = match config.target {
        IndexTarget::OpenSearch(ref opensearch) => {
            info!(url = %opensearch.base_url(), "Using OpenSearch indexer");
            Arc::new(OpenSearchIndexer::new(opensearch)?)
        }
        IndexTarget::Stdout => Arc::new(StdoutIndexer::new()),
    };

    Ok(FlowLogTransformer::new(config.transformer, fetcher, indexer)?)
}

/// Serves the Lambda runtime API until the process is stopped.
async fn run_lambda(transformer: Arc<FlowLogTransformer>) -> Result<()> {
    info!(index = %transformer.config().index, "Starting Lambda runtime");

    lambda_runtime::run(service_fn(move |event| {
        let transformer = Arc::clone(&transformer);
        async move { handler::handle(&transformer, event).await }
    }))
    .await
    .map_err(|e| anyhow::anyhow!("Lambda runtime failed: {}", e))
}

/// Processes one notification file and prints the stats as JSON.
async fn run_once(transformer: &FlowLogTransformer, path: &Path) -> Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read event file '{}'", path.display()))?;
    let event: NotificationEvent = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid notification in '{}'", path.display()))?;

    let stats = transformer.process(&event).await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
