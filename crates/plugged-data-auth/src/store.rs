//! Durable session storage.

use std::path::PathBuf;
use std::sync::Mutex;

use plugged_data_core::{ClientError, JsonSlotFile};

use crate::types::Session;

/// Slot under which the session is persisted.
pub const SESSION_SLOT: &str = "supabase.auth.token";

/// Where the auth client keeps its session between runs.
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    fn load(&self) -> Result<Option<Session>, ClientError>;
    fn save(&self, session: &Session) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

/// Process-local store; forgets everything on exit.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Session>>, ClientError> {
        self.slot
            .lock()
            .map_err(|_| ClientError::store("session store lock poisoned"))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, ClientError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, session: &Session) -> Result<(), ClientError> {
        *self.lock()? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.lock()? = None;
        Ok(())
    }
}

/// Session kept in a JSON file, under [`SESSION_SLOT`].
///
/// The file may hold other slots; only the session slot is touched.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    file: JsonSlotFile,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonSlotFile::new(path),
        }
    }

    /// `<config dir>/plugged-admin/session.json`.
    pub fn default_location() -> Result<Self, ClientError> {
        let dir = dirs::config_dir()
            .ok_or_else(|| ClientError::store("cannot determine the user config directory"))?;
        Ok(Self::new(dir.join("plugged-admin").join("session.json")))
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, ClientError> {
        self.file.get(SESSION_SLOT)
    }

    fn save(&self, session: &Session) -> Result<(), ClientError> {
        self.file.set(SESSION_SLOT, session)
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.file.remove(SESSION_SLOT)
    }
}
