//! Plugin configuration constants
//!
//! Central location for all fixed constants used throughout the plugin
//! core: timer cadence, the archival grace window, file names, and
//! display formats.

// ===== Reconciliation timing =====

/// Seconds between reconciliation passes
pub const TICK_INTERVAL_SECS: u64 = 10;

/// Milliseconds a completed reminder stays in the active list before it is
/// archived. Sibling devices sharing the synced store use this window to
/// display their own notification before the record disappears.
pub const ARCHIVE_GRACE_MS: i64 = 30_000;

// ===== Device identity =====

/// Length of the randomly generated fallback device identifier
pub const DEVICE_ID_LENGTH: usize = 7;

/// Sidecar file holding the generated fallback device identifier
pub const DEVICE_FILE_NAME: &str = "device-id";

// ===== Persistence =====

/// Name of the persisted settings document inside the plugin folder
pub const DATA_FILE_NAME: &str = "data.json";

// ===== Notifications =====

/// Seconds a reminder notice stays on screen before the fallback timer
/// force-closes it
pub const NOTICE_DISPLAY_SECS: u32 = 10;

/// Timestamp pattern for audit notes ("YYYY-MM-DD hh:mm.ss A")
pub const AUDIT_DATE_FORMAT: &str = "%Y-%m-%d %I:%M.%S %p";

/// Timestamp pattern for notification banners ("hh:mm A on MMM Do")
pub const NOTICE_DATE_FORMAT: &str = "%I:%M %p on %b %d";
