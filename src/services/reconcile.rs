//! Reconciliation engine
//!
//! The heart of the plugin. Each pass evaluates every active reminder
//! against the wall clock and decides whether it fires a notification, is
//! marked seen by this device, or moves to the archive. Passes tolerate the
//! backing file being rewritten by peer devices between ticks: the store is
//! reloaded when stale and mutations are only written back when something
//! actually changed.
//!
//! Per-reminder lifecycle across passes:
//! PENDING (remindNext set, completed unset) ->
//! FIRED-UNSEEN-BY-SOME-DEVICES (completed set, seen partially populated) ->
//! ARCHIVED (moved off the active list after the grace window).

use crate::config;
use crate::host::{Clock, NotificationSink, PresentationSink};
use crate::services::scheduler::InstanceToken;
use crate::services::sync_gate::SyncGate;
use crate::store::{PersistedStore, Reminder};
use crate::time::format_for_display;
use std::sync::Arc;

/// What one reconciliation pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// This instance was superseded by a newer plugin load; it never
    /// reconciles again
    Halted,
    /// Sync was busy; nothing evaluated, nothing written
    Skipped,
    /// A full sweep ran
    Swept { fired: usize, archived: usize },
}

pub struct ReconcileEngine {
    store: PersistedStore,
    device_id: String,
    gate: SyncGate,
    clock: Arc<dyn Clock>,
    notifications: Arc<dyn NotificationSink>,
    presentation: Option<Arc<dyn PresentationSink>>,
    instance: Option<InstanceToken>,
    halted: bool,
}

impl ReconcileEngine {
    pub fn new(
        store: PersistedStore,
        device_id: impl Into<String>,
        gate: SyncGate,
        clock: Arc<dyn Clock>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            device_id: device_id.into(),
            gate,
            clock,
            notifications,
            presentation: None,
            instance: None,
            halted: false,
        }
    }

    /// Attach the sidebar view
    pub fn with_presentation(mut self, sink: Arc<dyn PresentationSink>) -> Self {
        self.presentation = Some(sink);
        self
    }

    /// Attach the hot-reload guard token
    pub fn with_instance_token(mut self, token: InstanceToken) -> Self {
        self.instance = Some(token);
        self
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn store(&self) -> &PersistedStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PersistedStore {
        &mut self.store
    }

    /// One reconciliation pass. Invoked on every timer tick and on demand
    /// after intake, manual delete and view activation.
    pub fn run_pass(&mut self) -> PassOutcome {
        if self.halted {
            return PassOutcome::Halted;
        }
        if let Some(token) = &self.instance {
            if !token.is_current() {
                tracing::info!(
                    "[{}] Superseded by a newer plugin instance, stopping reconciliation",
                    self.device_id
                );
                self.halted = true;
                return PassOutcome::Halted;
            }
        }
        if !self.gate.may_reconcile_now() {
            return PassOutcome::Skipped;
        }
        if self.store.reload_if_stale() {
            tracing::debug!("[{}] Reconciling freshly synced settings", self.device_id);
        }

        let now = self.clock.now_ms();
        let device_id = self.device_id.clone();
        let notifications = Arc::clone(&self.notifications);
        let settings = self.store.settings_mut();

        let mut fired = 0usize;
        let mut archived = 0usize;
        let mut idx = 0;
        while idx < settings.reminders.len() {
            let reminder = &mut settings.reminders[idx];
            if reminder.is_inert() {
                idx += 1;
                continue;
            }

            let unseen_here = !reminder.seen_by(&device_id);
            if (!reminder.is_completed() || unseen_here) && reminder.is_due(now) {
                fire_reminder(reminder, &device_id, now, notifications.as_ref());
                fired += 1;
            }

            // Archivability is evaluated in the same pass, including right
            // after a fire (where the fresh completion stamp keeps the
            // reminder inside the grace window)
            if reminder.is_archivable(now) {
                let mut archiving = settings.reminders.remove(idx);
                archiving.push_note(&device_id, now, "Archived reminder");
                archiving.modified_at = now;
                tracing::info!(
                    "[{}] Archived reminder {} ({:?})",
                    device_id,
                    archiving.id,
                    archiving.title
                );
                settings.archived.push(archiving);
                archived += 1;
                // The removed slot now holds the next reminder
                continue;
            }
            idx += 1;
        }

        self.push_presentation();

        if fired > 0 || archived > 0 {
            self.store.settings_mut().last_updated = now;
            if let Err(e) = self.store.save() {
                tracing::error!(
                    "[{}] Failed to save settings after pass: {}",
                    self.device_id,
                    e
                );
            }
        }

        PassOutcome::Swept { fired, archived }
    }

    /// Push the sorted active list to the sidebar, skipped entirely when no
    /// UI is observing
    fn push_presentation(&self) {
        let Some(sink) = &self.presentation else {
            return;
        };
        if !sink.is_visible() {
            return;
        }
        let mut active: Vec<Reminder> = self
            .store
            .settings()
            .reminders
            .iter()
            .filter(|r| !r.is_inert())
            .cloned()
            .collect();
        active.sort_by_key(|r| r.remind_next);
        sink.render(&active);
    }
}

/// Fire one due reminder on this device: emit both notifications, stamp the
/// completion, record the device as having seen this completion cycle.
///
/// Sink failures are logged and never abort the pass; the remaining
/// reminders still get processed.
fn fire_reminder(
    reminder: &mut Reminder,
    device_id: &str,
    now_ms: i64,
    sink: &dyn NotificationSink,
) {
    tracing::info!(
        "[{}] Reminder {} due ({:?}), notifying",
        device_id,
        reminder.id,
        reminder.title
    );
    if let Err(e) = sink.notify(
        &reminder.title,
        reminder.remind_next,
        config::NOTICE_DISPLAY_SECS,
    ) {
        tracing::error!("Failed to show notice for reminder {}: {}", reminder.id, e);
    }
    let body = format!(
        "{} at {}",
        reminder.title,
        format_for_display(reminder.remind_next, config::NOTICE_DATE_FORMAT)
    );
    if let Err(e) = sink.notify_desktop(&reminder.title, &body) {
        tracing::error!(
            "Failed to send desktop notification for reminder {}: {}",
            reminder.id,
            e
        );
    }

    // The fired history only grows on the first completion; peer devices
    // firing later for their own screens re-stamp `completed` (restarting
    // the grace window) but do not duplicate the history entry
    if !reminder.is_completed() {
        reminder.remind_prev.push(reminder.remind_next);
    }
    reminder.completed = now_ms;
    if !reminder.seen_by(device_id) {
        reminder.seen.push(device_id.to_string());
    }
    reminder.modified_at = now_ms;
    reminder.push_note(device_id, now_ms, "Fired reminder");
}
