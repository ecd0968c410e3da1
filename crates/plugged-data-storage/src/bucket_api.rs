use reqwest::multipart::{Form, Part};
use url::Url;

use plugged_data_core::http::api_key_headers;
use plugged_data_core::{ErrorInfo, Response};

use crate::client::StorageClient;
use crate::types::{FileOptions, PublicUrl, UploadResponse};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Object operations scoped to one bucket.
#[derive(Debug, Clone)]
pub struct StorageBucketApi {
    client: StorageClient,
    bucket_id: String,
}

impl StorageBucketApi {
    pub(crate) fn new(client: StorageClient, bucket_id: &str) -> Self {
        Self {
            client,
            bucket_id: bucket_id.to_string(),
        }
    }

    pub fn bucket_id(&self) -> &str {
        &self.bucket_id
    }

    /// Upload `data` as `file_name` in a multipart form.
    ///
    /// A non-2xx answer becomes `Upload failed: {status} {body}`.
    pub async fn upload(&self, file_name: &str, data: Vec<u8>, options: FileOptions) -> Response<UploadResponse> {
        match self.try_upload(file_name, data, &options).await {
            Ok(uploaded) => Response::ok(uploaded),
            Err(e) => Response::error(e.redact(self.client.connection().api_key())),
        }
    }

    /// Public address of `file_name`. Built locally; nothing is sent.
    ///
    /// Each `/`-separated part of the name is percent-encoded, the same way
    /// [`upload`](Self::upload) addresses it.
    pub fn get_public_url(&self, file_name: &str) -> PublicUrl {
        PublicUrl {
            public_url: self.object_url(&["object", "public"], file_name).into(),
        }
    }

    fn object_url(&self, route: &[&str], file_name: &str) -> Url {
        let mut url = self.client.base_url().clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(route)
                .push(&self.bucket_id)
                .extend(file_name.split('/'));
        }
        url
    }

    async fn try_upload(
        &self,
        file_name: &str,
        data: Vec<u8>,
        options: &FileOptions,
    ) -> Result<UploadResponse, ErrorInfo> {
        validate_object_name(file_name)?;
        let conn = self.client.connection();
        let url = self.object_url(&["object"], file_name);

        let content_type = options
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        let size = data.len();
        let part = Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| ErrorInfo::invalid_request(format!("Invalid content type: {e}")))?;
        let form = Form::new().part("file", part);

        let mut req = conn
            .http()
            .post(url.clone())
            .headers(api_key_headers(conn.api_key()).map_err(ErrorInfo::from)?)
            .multipart(form);
        if let Some(cache) = &options.cache_control {
            req = req.header("cache-control", format!("max-age={cache}"));
        }
        if let Some(upsert) = options.upsert {
            req = req.header("x-upsert", if upsert { "true" } else { "false" });
        }

        tracing::debug!(url = %url, size, "Uploading object");
        let resp = req
            .send()
            .await
            .map_err(|e| ErrorInfo::transport(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ErrorInfo::transport(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(ErrorInfo::upstream(
                status,
                format!("Upload failed: {status} {}", body.trim()),
            ));
        }

        if body.trim().is_empty() {
            return Ok(UploadResponse::default());
        }
        serde_json::from_str(&body)
            .map_err(|e| ErrorInfo::serialization(format!("Invalid upload response: {e}")))
    }
}

/// Reject names that would address a different object than the one named.
///
/// `/` separates folders; empty, `.` and `..` parts are refused, as are `?`,
/// `#`, `\` and control characters.
pub fn validate_object_name(file_name: &str) -> Result<(), ErrorInfo> {
    let invalid = |reason: &str| {
        Err(ErrorInfo::invalid_request(format!(
            "Invalid object name {file_name:?}: {reason}"
        )))
    };
    if file_name.is_empty() {
        return invalid("empty name");
    }
    if file_name.contains(['?', '#', '\\']) || file_name.chars().any(char::is_control) {
        return invalid("contains prohibited characters");
    }
    if file_name
        .split('/')
        .any(|part| part.is_empty() || part == "." || part == "..")
    {
        return invalid("empty or relative path segment");
    }
    Ok(())
}
