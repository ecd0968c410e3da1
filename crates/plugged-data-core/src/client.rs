use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Connection handle to the hosted data platform.
///
/// Holds the project URL, the API key and a shared HTTP client. Creating one
/// validates the configuration but performs no network call. Cheap to clone;
/// every sub-client keeps its own clone.
#[derive(Debug, Clone)]
pub struct Connection {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl Connection {
    /// Create a connection from a configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Shorthand for `Connection::new(ClientConfig::new(url, api_key))`.
    pub fn connect(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(ClientConfig::new(url, api_key))
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Project URL without a trailing slash.
    pub fn url(&self) -> &str {
        self.config.base_url()
    }

    pub fn api_key(&self) -> &str {
        &self.config.api_key
    }

    pub fn schema(&self) -> &str {
        &self.config.schema
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `{url}/rest/v1`
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url())
    }

    /// `{url}/auth/v1`
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url())
    }

    /// `{url}/storage/v1`
    pub fn storage_url(&self) -> String {
        format!("{}/storage/v1", self.url())
    }
}
