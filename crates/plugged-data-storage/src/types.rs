use serde::{Deserialize, Serialize};

/// Options for an upload.
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    /// Seconds, sent as `cache-control: max-age=<value>`.
    pub cache_control: Option<String>,
    /// MIME type of the file part; `application/octet-stream` when unset.
    pub content_type: Option<String>,
    /// Sent as `x-upsert`; the server refuses to overwrite unless `true`.
    pub upsert: Option<bool>,
}

impl FileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_control(mut self, value: &str) -> Self {
        self.cache_control = Some(value.to_string());
        self
    }

    pub fn content_type(mut self, value: &str) -> Self {
        self.content_type = Some(value.to_string());
        self
    }

    pub fn upsert(mut self, value: bool) -> Self {
        self.upsert = Some(value);
        self
    }
}

/// Body of a successful upload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UploadResponse {
    #[serde(default, rename = "Id")]
    pub id: Option<String>,
    /// `{bucket}/{name}` of the stored object.
    #[serde(default, rename = "Key")]
    pub key: Option<String>,
}

/// Public address of an object in a public bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUrl {
    #[serde(rename = "publicUrl")]
    pub public_url: String,
}
