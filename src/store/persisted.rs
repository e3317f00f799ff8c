//! Persisted store
//!
//! Single source of truth for plugin settings, backed by a JSON document in
//! the plugin folder. Tracks the backing file's modification time so a
//! reconciliation pass never runs against a snapshot that another device
//! already rewrote.

use crate::error::Result;
use crate::host::FileProvider;
use crate::store::models::Settings;
use std::sync::Arc;

pub struct PersistedStore {
    files: Arc<dyn FileProvider>,
    path: String,
    settings: Settings,
    last_loaded_mtime_ms: i64,
}

impl PersistedStore {
    /// Open the store, loading the backing file or seeding defaults.
    ///
    /// The seed save only happens when the file does not exist yet; an
    /// existing file is never rewritten at startup, so a locally stale copy
    /// cannot clobber a peer's synced document before the first pass.
    pub fn open(files: Arc<dyn FileProvider>, path: impl Into<String>) -> Result<Self> {
        let mut store = Self {
            files,
            path: path.into(),
            settings: Settings::default(),
            last_loaded_mtime_ms: 0,
        };
        if !store.load() {
            store.save()?;
        }
        Ok(store)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Read the backing file into memory, returning whether it existed.
    ///
    /// Never fatal: an unreadable or corrupt document falls back to
    /// defaults with a warning.
    pub fn load(&mut self) -> bool {
        let bytes = match self.files.read_all(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}; using defaults", self.path, e);
                None
            }
        };
        let Some(bytes) = bytes else {
            self.settings = Settings::default();
            return false;
        };
        self.settings = match serde_json::from_slice(&bytes) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}; using defaults", self.path, e);
                Settings::default()
            }
        };
        self.last_loaded_mtime_ms = self.stat_mtime().unwrap_or(0);
        tracing::debug!(
            "Loaded settings from {} ({} active, {} archived)",
            self.path,
            self.settings.reminders.len(),
            self.settings.archived.len()
        );
        true
    }

    /// Write the full settings document. The in-memory model stays intact
    /// when the write fails; the error surfaces to the caller.
    pub fn save(&mut self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.settings)?;
        self.files.write_all(&self.path, &bytes)?;
        if let Some(mtime_ms) = self.stat_mtime() {
            self.last_loaded_mtime_ms = mtime_ms;
        }
        tracing::debug!("Settings saved to {}", self.path);
        Ok(())
    }

    /// Reload when another process wrote the backing file since our last
    /// load. Returns true when a reload happened.
    pub fn reload_if_stale(&mut self) -> bool {
        let Some(mtime_ms) = self.stat_mtime() else {
            return false;
        };
        if mtime_ms <= self.last_loaded_mtime_ms {
            return false;
        }
        tracing::info!(
            "{} changed on disk (mtime {} > {}), reloading",
            self.path,
            mtime_ms,
            self.last_loaded_mtime_ms
        );
        self.load();
        true
    }

    /// Remove an active reminder, as from the sidebar delete control.
    /// Returns whether anything was removed.
    pub fn delete_reminder(&mut self, id: i64) -> Result<bool> {
        let before = self.settings.reminders.len();
        self.settings.reminders.retain(|r| r.id != id);
        if self.settings.reminders.len() == before {
            return Ok(false);
        }
        tracing::info!("Deleted reminder {}", id);
        self.save()?;
        Ok(true)
    }

    /// Persist the sidebar collapsed preference for one reminder
    pub fn set_collapsed(&mut self, id: i64, collapsed: bool) -> Result<bool> {
        let Some(reminder) = self.settings.reminders.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        if reminder.collapsed == collapsed {
            return Ok(true);
        }
        reminder.collapsed = collapsed;
        self.save()?;
        Ok(true)
    }

    fn stat_mtime(&self) -> Option<i64> {
        match self.files.stat(&self.path) {
            Ok(Some(stat)) => Some(stat.mtime_ms),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to stat {}: {}", self.path, e);
                None
            }
        }
    }
}
