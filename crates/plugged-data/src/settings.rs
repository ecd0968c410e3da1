//! Saved connection settings for the dashboard.
//!
//! The project URL and key live in the same JSON file as the session, under
//! their own slots. Environment variables fill in whatever was never saved.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use plugged_data_auth::FileSessionStore;
use plugged_data_core::config::{KEY_ENV, URL_ENV};
use plugged_data_core::{ClientError, JsonSlotFile};

use crate::client::AdminClient;

pub const URL_SLOT: &str = "supabase.url";
pub const KEY_SLOT: &str = "supabase.key";

/// Project URL and API key as the settings screen edits them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub key: String,
}

impl SupabaseSettings {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Debug for SupabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseSettings")
            .field("url", &self.url)
            .field("key", &"[redacted]")
            .finish()
    }
}

/// File-backed settings shared with the session store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    file: JsonSlotFile,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonSlotFile::new(path),
        }
    }

    /// `<config dir>/plugged-admin/config.json`.
    pub fn default_location() -> Result<Self, ClientError> {
        let dir = dirs::config_dir()
            .ok_or_else(|| ClientError::store("cannot determine the user config directory"))?;
        Ok(Self::new(dir.join("plugged-admin").join("config.json")))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Saved settings, each value falling back to its environment variable.
    ///
    /// `None` when either value is missing from both places.
    pub fn get_supabase_config(&self) -> Result<Option<SupabaseSettings>, ClientError> {
        self.resolve(|name| std::env::var(name).ok())
    }

    pub fn set_supabase_config(&self, settings: &SupabaseSettings) -> Result<(), ClientError> {
        self.file.set(URL_SLOT, &settings.url)?;
        self.file.set(KEY_SLOT, &settings.key)?;
        tracing::info!(url = %settings.url, "Saved connection settings");
        Ok(())
    }

    /// Build a client from the resolved settings, keeping the session in
    /// this same file.
    pub fn connect(&self) -> Result<AdminClient, ClientError> {
        let settings = self.get_supabase_config()?.ok_or_else(|| {
            ClientError::config(format!(
                "no saved connection settings and {URL_ENV}/{KEY_ENV} are not set"
            ))
        })?;
        let sessions = FileSessionStore::new(self.file.path());
        AdminClient::with_session_store(settings.url, settings.key, Arc::new(sessions))
    }

    fn resolve(&self, env: impl Fn(&str) -> Option<String>) -> Result<Option<SupabaseSettings>, ClientError> {
        let saved = |slot: &str, var: &str| -> Result<Option<String>, ClientError> {
            let value = self.file.get::<String>(slot)?.filter(|v| !v.trim().is_empty());
            Ok(value.or_else(|| env(var).filter(|v| !v.trim().is_empty())))
        };
        let url = saved(URL_SLOT, URL_ENV)?;
        let key = saved(KEY_SLOT, KEY_ENV)?;
        Ok(match (url, key) {
            (Some(url), Some(key)) => Some(SupabaseSettings { url, key }),
            _ => None,
        })
    }
}
