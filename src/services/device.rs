//! Device identity resolver
//!
//! The `seen` list on a reminder tracks which devices already displayed a
//! notification, so each device needs an identity that is stable for the
//! lifetime of one installation. The sync subsystem's configured device
//! name wins when available; otherwise a short random identifier is
//! generated once and persisted in the plugin folder.

use crate::config;
use crate::host::{FileProvider, SyncStatusProvider};
use rand::Rng;

/// Resolve this device's identifier
pub fn resolve_device_id(
    files: &dyn FileProvider,
    sync: Option<&dyn SyncStatusProvider>,
) -> String {
    if let Some(name) = sync.and_then(|s| s.device_name()) {
        let name = name.trim().to_string();
        if !name.is_empty() {
            tracing::debug!("Using sync device name: {}", name);
            return name;
        }
    }

    match files.read_all(config::DEVICE_FILE_NAME) {
        Ok(Some(bytes)) => {
            let id = String::from_utf8_lossy(&bytes).trim().to_string();
            if !id.is_empty() {
                tracing::debug!("Using persisted device id: {}", id);
                return id;
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Failed to read device id file: {}", e),
    }

    let id = random_device_id();
    if let Err(e) = files.write_all(config::DEVICE_FILE_NAME, id.as_bytes()) {
        // Session-only id then; the seen list just gains a fresh entry on
        // the next run
        tracing::warn!("Failed to persist device id {}: {}", id, e);
    } else {
        tracing::info!("Generated device id: {}", id);
    }
    id
}

fn random_device_id() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..config::DEVICE_ID_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}
