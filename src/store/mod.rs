//! Store module
//!
//! Persisted models and the JSON-backed settings store.

pub mod models;
pub mod persisted;

pub use models::{Alert, ConfigSettings, Occurrence, Recurrence, Reminder, Settings};
pub use persisted::PersistedStore;
