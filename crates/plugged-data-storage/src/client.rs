use url::Url;

use plugged_data_core::{ClientError, Connection};

use crate::bucket_api::StorageBucketApi;

/// Client for the object storage API at `/storage/v1`.
#[derive(Debug, Clone)]
pub struct StorageClient {
    conn: Connection,
    base_url: Url,
}

impl StorageClient {
    pub fn new(conn: Connection) -> Result<Self, ClientError> {
        let base_url = Url::parse(&conn.storage_url())
            .map_err(|e| ClientError::config(format!("Invalid storage URL: {e}")))?;
        Ok(Self { conn, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Operations on one bucket.
    pub fn from(&self, bucket_id: &str) -> StorageBucketApi {
        StorageBucketApi::new(self.clone(), bucket_id)
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}
