//! Turns parsed arguments into validated component configuration.

use crate::args::Cli;
use fl_error::{ErrorPolicy, FlError, Result};
use fl_opensearch::OpenSearchConfig;
use fl_s3::S3Config;
use fl_traits::Refresh;
use fl_transformer::TransformerConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Where documents are sent.
#[derive(Debug, Clone)]
pub enum IndexTarget {
    /// OpenSearch over HTTPS
    OpenSearch(OpenSearchConfig),

    /// JSON lines on stdout
    Stdout,
}

/// Where objects are read from.
#[derive(Debug, Clone)]
pub enum ObjectSource {
    /// S3 through the AWS SDK
    S3(S3Config),

    /// A local directory laid out as `<root>/<bucket>/<key>`
    Local(PathBuf),
}

/// Validated process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub transformer: TransformerConfig,
    pub target: IndexTarget,
    pub source: ObjectSource,
}

impl AppConfig {
    /// Validates the arguments.
    ///
    /// Every missing required option is reported in one error, by its
    /// environment variable name.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut missing = Vec::new();

        let index = match cli.opensearch_index.as_deref().map(str::trim) {
            Some(index) if !index.is_empty() => index.to_string(),
            _ => {
                missing.push("OPENSEARCH_INDEX");
                String::new()
            }
        };

        let target = if cli.dry_run {
            IndexTarget::Stdout
        } else {
            let host = required(&cli.opensearch_host, "OPENSEARCH_HOST", &mut missing);
            let user = required(&cli.opensearch_user, "OPENSEARCH_USER", &mut missing);
            let password = required(&cli.opensearch_password, "OPENSEARCH_PASSWORD", &mut missing);

            IndexTarget::OpenSearch(
                OpenSearchConfig::new(host)
                    .with_port(cli.opensearch_port)
                    .with_credentials(user, password)
                    .with_timeout(Duration::from_secs(cli.opensearch_timeout_secs))
                    .with_compression(cli.opensearch_compress),
            )
        };

        if !missing.is_empty() {
            return Err(FlError::Config(format!(
                "Missing required configuration: {}",
                missing.join(", ")
            )));
        }

        let refresh: Refresh = cli.refresh.parse()?;
        let malformed_lines: ErrorPolicy = cli.malformed_lines.parse()?;
        let index_failures: ErrorPolicy = cli.index_failures.parse()?;

        let mut transformer = TransformerConfig::new(index)
            .with_refresh(refresh)
            .with_excluded_addresses(cli.excluded_addresses.iter().cloned())
            .with_malformed_lines(malformed_lines)
            .with_index_failures(index_failures);
        if let Some(dir) = &cli.scratch_dir {
            transformer = transformer.with_scratch_dir(dir.clone());
        }
        transformer.validate()?;

        let source = match &cli.local_root {
            Some(root) => ObjectSource::Local(root.clone()),
            None => {
                let mut s3 = S3Config::new();
                if let Some(region) = &cli.region {
                    s3 = s3.with_region(region);
                }
                if let Some(endpoint) = &cli.s3_endpoint {
                    s3 = s3.with_endpoint(endpoint);
                }
                ObjectSource::S3(s3)
            }
        };

        Ok(Self {
            transformer,
            target,
            source,
        })
    }
}

fn required(value: &Option<String>, env: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            missing.push(env);
            String::new()
        }
    }
}
