use std::sync::Arc;

use plugged_data_auth::{AuthClient, FileSessionStore, SessionStore};
use plugged_data_core::{ClientConfig, ClientError, Connection};
use plugged_data_query::{ConnectionQueryExt, QueryBuilder};
use plugged_data_storage::StorageClient;

/// The handle the dashboard holds: one connection plus its sub-clients.
///
/// Build it once and pass it (or a clone) to whatever needs data access.
/// Clones share the signed-in session.
#[derive(Debug, Clone)]
pub struct AdminClient {
    conn: Connection,
    auth: AuthClient,
    storage: StorageClient,
}

impl AdminClient {
    /// Connect with the session persisted in the default location.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ClientError> {
        let store = FileSessionStore::default_location()?;
        Self::from_config(ClientConfig::new(url, api_key), Arc::new(store))
    }

    /// Connect with a caller-supplied session store.
    pub fn with_session_store(
        url: impl Into<String>,
        api_key: impl Into<String>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, ClientError> {
        Self::from_config(ClientConfig::new(url, api_key), store)
    }

    pub fn from_config(config: ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self, ClientError> {
        let conn = Connection::new(config)?;
        let auth = AuthClient::new(conn.clone(), store)?;
        let storage = StorageClient::new(conn.clone())?;
        tracing::debug!(url = conn.url(), "Admin client ready");
        Ok(Self {
            conn,
            auth,
            storage,
        })
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    pub fn storage(&self) -> &StorageClient {
        &self.storage
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Start a query on `table`.
    pub fn from(&self, table: &str) -> QueryBuilder {
        self.conn.from(table)
    }
}
