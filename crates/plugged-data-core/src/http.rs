//! Helpers shared by the REST, auth and storage sub-clients.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;

use crate::error::{ClientError, ErrorInfo};

/// `apikey` and `Authorization: Bearer` headers for the given key.
pub fn api_key_headers(api_key: &str) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        "apikey",
        HeaderValue::from_str(api_key)
            .map_err(|e| ClientError::config(format!("Invalid API key header: {e}")))?,
    );
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| ClientError::config(format!("Invalid auth header: {e}")))?,
    );
    Ok(headers)
}

/// Error body shapes returned by PostgREST, GoTrue and the storage API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl ApiErrorBody {
    /// The most informative message in the body, if any.
    pub fn error_message(&self) -> Option<String> {
        self.error_description
            .as_deref()
            .or(self.msg.as_deref())
            .or(self.message.as_deref())
            .or(self.error.as_deref())
            .map(str::to_string)
    }

    pub fn code_string(&self) -> Option<String> {
        match &self.code {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Turn a non-2xx status and its body text into an [`ErrorInfo`].
///
/// JSON bodies contribute their message and code; anything else is used
/// verbatim, and an empty body falls back to `fallback`.
pub fn upstream_error(status: u16, body: &str, fallback: &str) -> ErrorInfo {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = parsed.error_message() {
            let info = ErrorInfo::upstream(status, message);
            return match parsed.code_string() {
                Some(code) => info.with_code(code),
                None => info,
            };
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        ErrorInfo::upstream(status, format!("{fallback} (HTTP {status})"))
    } else {
        ErrorInfo::upstream(status, trimmed.to_string())
    }
}
