//! Named slots persisted in a single JSON file.
//!
//! Holds small pieces of durable local state (the signed-in session, the
//! saved project settings) under fixed key names, the way a desktop key/value
//! store would. Every write rewrites the whole file, so a reader never sees a
//! half-written slot.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::ClientError;

/// A JSON object on disk whose top-level keys are slots.
#[derive(Debug, Clone)]
pub struct JsonSlotFile {
    path: PathBuf,
}

impl JsonSlotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one slot. A missing file or missing slot is `Ok(None)`.
    pub fn get<T: DeserializeOwned>(&self, slot: &str) -> Result<Option<T>, ClientError> {
        let slots = self.read_all()?;
        match slots.get(slot) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
        }
    }

    /// Write one slot, leaving the others untouched.
    pub fn set<T: Serialize>(&self, slot: &str, value: &T) -> Result<(), ClientError> {
        let mut slots = self.read_all()?;
        slots.insert(slot.to_string(), serde_json::to_value(value)?);
        self.write_all(&slots)
    }

    /// Remove one slot. Removing an absent slot is not an error.
    pub fn remove(&self, slot: &str) -> Result<(), ClientError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut slots = self.read_all()?;
        if slots.remove(slot).is_some() {
            self.write_all(&slots)?;
        }
        Ok(())
    }

    fn read_all(&self) -> Result<Map<String, JsonValue>, ClientError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            ClientError::store(format!("cannot read '{}': {e}", self.path.display()))
        })?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<JsonValue>(&contents) {
            Ok(JsonValue::Object(map)) => Ok(map),
            Ok(_) => Err(ClientError::store(format!(
                "'{}' does not contain a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(ClientError::store(format!(
                "corrupted file '{}': {e}",
                self.path.display()
            ))),
        }
    }

    fn write_all(&self, slots: &Map<String, JsonValue>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ClientError::store(format!(
                        "cannot create directory '{}': {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let contents = serde_json::to_string_pretty(slots)?;
        fs::write(&self.path, contents).map_err(|e| {
            ClientError::store(format!("cannot write '{}': {e}", self.path.display()))
        })?;

        // Slots may hold tokens and keys: owner read/write only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                ClientError::store(format!(
                    "cannot set permissions on '{}': {e}",
                    self.path.display()
                ))
            })?;
        }

        tracing::debug!(path = %self.path.display(), slots = slots.len(), "Wrote slot file");
        Ok(())
    }
}
