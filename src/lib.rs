//! Reminder Notifications plugin core
//!
//! Reminder lifecycle engine for a note-taking host application: timed
//! reminders persisted to a host-managed JSON file, polled against the wall
//! clock on a fixed interval, and surfaced as in-app and desktop
//! notifications. Per-device "seen" tracking plus a grace window before
//! archival keep devices sharing one synced data file from spamming
//! duplicate notifications or deleting a reminder before a peer displayed
//! it.
//!
//! Host plumbing (modals, sidebar DOM, vault adapter, native notices) stays
//! behind the narrow traits in [`host`].

pub mod config;
pub mod error;
pub mod host;
pub mod services;
pub mod store;
pub mod time;
