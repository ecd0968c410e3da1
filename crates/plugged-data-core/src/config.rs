use url::Url;

use crate::error::ClientError;

/// Environment variable holding the project URL.
pub const URL_ENV: &str = "SUPABASE_URL";
/// Environment variable holding the API key.
pub const KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Configuration for connecting to the hosted data platform.
///
/// Both `url` and `api_key` are required. Nothing here touches the network;
/// a bad host only surfaces once an operation runs.
#[derive(Clone)]
pub struct ClientConfig {
    /// Project URL (e.g. "https://abc.supabase.co")
    pub url: String,
    /// API key sent as the `apikey` header and bearer credential
    pub api_key: String,
    /// Default schema (defaults to "public")
    pub schema: String,
}

impl ClientConfig {
    /// Create a new config from a project URL and API key.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            schema: "public".to_string(),
        }
    }

    /// Read the config from `SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY`.
    pub fn from_env() -> Result<Self, ClientError> {
        let url = std::env::var(URL_ENV)
            .map_err(|_| ClientError::config(format!("{URL_ENV} is not set")))?;
        let key = std::env::var(KEY_ENV)
            .map_err(|_| ClientError::config(format!("{KEY_ENV} is not set")))?;
        let config = Self::new(url, key);
        config.validate()?;
        Ok(config)
    }

    /// Set the default schema.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Check that both values are present and the URL is usable.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.url.trim().is_empty() {
            return Err(ClientError::config("project URL is required"));
        }
        if self.api_key.trim().is_empty() {
            return Err(ClientError::config("API key is required"));
        }
        let parsed = Url::parse(self.url.trim())
            .map_err(|e| ClientError::config(format!("invalid project URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::config(format!(
                "unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }
        Ok(())
    }

    /// Project URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim().trim_end_matches('/')
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("api_key", &"[redacted]")
            .field("schema", &self.schema)
            .finish()
    }
}
