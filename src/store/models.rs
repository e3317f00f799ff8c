//! Persisted models
//!
//! Rust structs matching the on-disk JSON schema of the plugin data file.
//! Field names stay camelCase so documents written by other devices running
//! earlier plugin revisions keep loading, and every field carries a serde
//! default so missing keys are backfilled instead of failing the load.

use crate::config;
use crate::time::format_for_display;
use serde::{Deserialize, Serialize};

/// Interval vocabulary of the recurrence schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occurrence {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

/// Recurrence descriptor. Present in the schema for forward compatibility;
/// reconciliation does not consume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recurrence {
    #[serde(rename = "type")]
    pub kind: Occurrence,
    pub start: i64,
    pub end: i64,
    pub interval: i64,
}

/// Alert-offset descriptor. Schema compatibility only, like [`Recurrence`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: Occurrence,
    pub value: i64,
}

/// One user-created timed alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reminder {
    /// Creation timestamp doubles as the id. Collision-unlikely, not
    /// collision-proof.
    pub id: i64,
    pub created_at: i64,
    pub modified_at: i64,
    pub title: String,
    /// Currently always a copy of `title`
    pub content: String,
    /// Next fire time in epoch milliseconds; `0` means inert, never fires
    pub remind_next: i64,
    /// Previously fired `remind_next` values, append-only
    pub remind_prev: Vec<i64>,
    pub recurring: Option<Recurrence>,
    pub remind: Vec<Alert>,
    /// Epoch milliseconds when this device or a peer most recently marked
    /// the reminder fired; `0` means not yet completed
    pub completed: i64,
    /// Devices that already displayed a notification for the current
    /// completion cycle
    pub seen: Vec<String>,
    /// Newline-delimited audit log; written, never parsed back
    pub notes: String,
    /// Sidebar presentation preference
    pub collapsed: bool,
}

impl Default for Reminder {
    fn default() -> Self {
        Self {
            id: 0,
            created_at: 0,
            modified_at: 0,
            title: String::new(),
            content: String::new(),
            remind_next: 0,
            remind_prev: Vec::new(),
            recurring: None,
            remind: Vec::new(),
            completed: 0,
            seen: Vec::new(),
            notes: String::new(),
            collapsed: false,
        }
    }
}

impl Reminder {
    /// Inert reminders are never selected by reconciliation
    pub fn is_inert(&self) -> bool {
        self.remind_next <= 0
    }

    /// Due: next fire time set and in the past
    pub fn is_due(&self, now_ms: i64) -> bool {
        self.remind_next > 0 && self.remind_next < now_ms
    }

    pub fn is_completed(&self) -> bool {
        self.completed > 0
    }

    pub fn seen_by(&self, device_id: &str) -> bool {
        self.seen.iter().any(|d| d == device_id)
    }

    /// Archivable once completion is older than the grace window
    pub fn is_archivable(&self, now_ms: i64) -> bool {
        self.is_completed() && now_ms - self.completed >= config::ARCHIVE_GRACE_MS
    }

    /// Append one audit line recording a lifecycle event on this device
    pub fn push_note(&mut self, device_id: &str, at_ms: i64, event: &str) {
        if !self.notes.is_empty() {
            self.notes.push('\n');
        }
        self.notes.push_str(&format!(
            "[{}] {} at {}",
            device_id,
            event,
            format_for_display(at_ms, config::AUDIT_DATE_FORMAT)
        ));
    }
}

/// Opaque configuration block carried through load and save untouched.
/// Shape kept from the original on-disk schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigSettings {
    pub my_setting: String,
    pub setting2: i64,
    pub setting3: String,
}

impl Default for ConfigSettings {
    fn default() -> Self {
        Self {
            my_setting: "default".to_string(),
            setting2: 2,
            setting3: "three".to_string(),
        }
    }
}

/// Root persisted object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "MyConfigSettings")]
    pub config: ConfigSettings,
    #[serde(rename = "lastUpdated")]
    pub last_updated: i64,
    /// Active reminders, reconciled every pass
    pub reminders: Vec<Reminder>,
    /// Terminal history, never reconciled again
    pub archived: Vec<Reminder>,
}
