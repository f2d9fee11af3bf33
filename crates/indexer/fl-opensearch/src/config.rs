//! Connection settings for the OpenSearch indexer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default HTTPS port of managed OpenSearch domains.
pub const DEFAULT_PORT: u16 = 443;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the OpenSearch indexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenSearchConfig {
    /// Domain hostname, or a full base URL when it carries a scheme
    pub host: String,

    /// Port used when `host` is a bare hostname
    pub port: u16,

    /// Basic-auth user
    pub username: Option<String>,

    /// Basic-auth password
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Gzip request bodies
    pub compress_requests: bool,
}

impl OpenSearchConfig {
    /// Create a configuration for the given host with defaults.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            timeout: DEFAULT_TIMEOUT,
            compress_requests: true,
        }
    }

    /// Set the port used for bare hostnames.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set basic-auth credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable gzip request bodies.
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress_requests = enabled;
        self
    }

    /// Base URL requests are sent to, without a trailing slash.
    ///
    /// A bare hostname is reached over HTTPS on `port`.
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{}:{}", host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OpenSearchConfig::new("search.example.com");

        assert_eq!(config.port, 443);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.compress_requests);
        assert!(config.username.is_none());
    }

    #[test]
    fn test_base_url_from_bare_host() {
        let config = OpenSearchConfig::new("search.example.com");
        assert_eq!(config.base_url(), "https://search.example.com:443");

        let config = OpenSearchConfig::new("search.example.com").with_port(9200);
        assert_eq!(config.base_url(), "https://search.example.com:9200");
    }

    #[test]
    fn test_base_url_keeps_explicit_scheme() {
        let config = OpenSearchConfig::new("http://localhost:9200/");
        assert_eq!(config.base_url(), "http://localhost:9200");
    }

    #[test]
    fn test_password_not_serialized() {
        let config = OpenSearchConfig::new("search.example.com").with_credentials("admin", "s3cret");
        let json = serde_json::to_string(&config).unwrap();

        assert!(json.contains("admin"));
        assert!(!json.contains("s3cret"));
        assert!(json.contains("\"timeout\":\"30s\""));
    }
}
