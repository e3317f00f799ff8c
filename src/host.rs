//! Host collaborator contracts
//!
//! Narrow interfaces over everything the host application provides: the
//! wall clock, the plugin-folder file adapter, the optional peer-sync
//! subsystem, the optional natural-language date parser, and the two sinks
//! the reconciliation engine emits to.

use crate::error::Result;
use crate::store::Reminder;
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

/// Source of the current wall-clock time in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Real wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually advanced clock for simulated-time tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(start_ms),
        }
    }

    pub fn set(&self, ts_ms: i64) {
        self.now_ms.store(ts_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Metadata returned by [`FileProvider::stat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Last modification time in epoch milliseconds
    pub mtime_ms: i64,
}

/// Host file adapter scoped to the plugin folder.
///
/// Paths are plugin-folder-relative names, not absolute paths. Reads of a
/// missing file return `Ok(None)` rather than an error.
pub trait FileProvider: Send + Sync {
    fn stat(&self, path: &str) -> Result<Option<FileStat>>;
    fn read_all(&self, path: &str) -> Result<Option<Vec<u8>>>;
    fn write_all(&self, path: &str, bytes: &[u8]) -> Result<()>;
}

/// [`FileProvider`] backed by a local directory
pub struct LocalFileProvider {
    root: PathBuf,
}

impl LocalFileProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl FileProvider for LocalFileProvider {
    fn stat(&self, path: &str) -> Result<Option<FileStat>> {
        match std::fs::metadata(self.resolve(path)) {
            Ok(meta) => {
                let mtime_ms = meta
                    .modified()?
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_millis() as i64)
                    .unwrap_or(0);
                Ok(Some(FileStat { mtime_ms }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_all(&self, path: &str) -> Result<Option<Vec<u8>>> {
        match std::fs::read(self.resolve(path)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, path: &str, bytes: &[u8]) -> Result<()> {
        std::fs::write(self.resolve(path), bytes)?;
        Ok(())
    }
}

/// In-memory [`FileProvider`] with monotonically advancing modification
/// times. Lets tests simulate a second device rewriting the shared file.
#[derive(Default)]
pub struct MemoryFileProvider {
    inner: Mutex<MemoryFiles>,
}

#[derive(Default)]
struct MemoryFiles {
    files: HashMap<String, (Vec<u8>, i64)>,
    tick: i64,
}

impl FileProvider for MemoryFileProvider {
    fn stat(&self, path: &str) -> Result<Option<FileStat>> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner
            .files
            .get(path)
            .map(|(_, mtime_ms)| FileStat { mtime_ms: *mtime_ms }))
    }

    fn read_all(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.files.get(path).map(|(bytes, _)| bytes.clone()))
    }

    fn write_all(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.tick += 1;
        let tick = inner.tick;
        inner.files.insert(path.to_string(), (bytes.to_vec(), tick));
        Ok(())
    }
}

/// Status reported by the host's optional peer-sync subsystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    FullySynced,
    Paused,
    Connecting,
    /// Any in-progress, non-terminal state, carrying the raw status string
    Busy(String),
}

/// Optional peer-sync subsystem
pub trait SyncStatusProvider: Send + Sync {
    /// `None` when the subsystem is installed but reports no status yet
    fn status(&self) -> Option<SyncStatus>;

    /// Stable device name configured in the sync subsystem, if any
    fn device_name(&self) -> Option<String> {
        None
    }
}

/// Optional natural-language date parser collaborator
pub trait NaturalDateParser: Send + Sync {
    /// Epoch-millisecond timestamp, or `None` when the text is not a date
    fn parse(&self, text: &str) -> Option<i64>;
}

/// Destination for "show this to the user now" events.
///
/// `notify` renders an in-app banner that stays visible until the user
/// dismisses it through an explicit close control; implementations must
/// override any auto-hide or click-outside-to-dismiss default of the host
/// notice mechanism, and run their own fallback timer that force-closes the
/// banner after `display_seconds`.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, title: &str, due_at_ms: i64, display_seconds: u32) -> Result<()>;

    /// Best-effort OS-level notification
    fn notify_desktop(&self, title: &str, body: &str) -> Result<()>;
}

/// [`NotificationSink`] that only logs, for headless hosts and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn notify(&self, title: &str, due_at_ms: i64, display_seconds: u32) -> Result<()> {
        tracing::info!(
            "Notice: {} (due at {}, shown {}s)",
            title,
            due_at_ms,
            display_seconds
        );
        Ok(())
    }

    fn notify_desktop(&self, title: &str, body: &str) -> Result<()> {
        tracing::info!("Desktop notification: {} - {}", title, body);
        Ok(())
    }
}

/// Destination for the sorted list of live reminders
pub trait PresentationSink: Send + Sync {
    /// Whether any UI is currently observing the list. When false the
    /// engine skips the render push entirely.
    fn is_visible(&self) -> bool;

    /// Receive the active reminders, sorted by next due time ascending
    fn render(&self, reminders: &[Reminder]);
}
