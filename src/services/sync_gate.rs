//! Sync-awareness gate
//!
//! Reconciliation must not run while the host's peer-sync subsystem is mid
//! transfer, or a pass could act on a half-written data file. The gate is a
//! best-effort heuristic over the reported status, not a lock.

use crate::host::{SyncStatus, SyncStatusProvider};
use std::sync::Arc;

pub struct SyncGate {
    provider: Option<Arc<dyn SyncStatusProvider>>,
}

impl SyncGate {
    pub fn new(provider: Option<Arc<dyn SyncStatusProvider>>) -> Self {
        Self { provider }
    }

    /// Whether it is safe to reconcile right now. False exactly when the
    /// subsystem reports an in-progress, non-terminal status.
    pub fn may_reconcile_now(&self) -> bool {
        let Some(provider) = &self.provider else {
            return true;
        };
        match provider.status() {
            None
            | Some(SyncStatus::FullySynced)
            | Some(SyncStatus::Paused)
            | Some(SyncStatus::Connecting) => true,
            Some(SyncStatus::Busy(status)) => {
                tracing::debug!("Sync busy ({}), skipping reconciliation", status);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSync(Option<SyncStatus>);

    impl SyncStatusProvider for FixedSync {
        fn status(&self) -> Option<SyncStatus> {
            self.0.clone()
        }
    }

    fn gate(status: Option<SyncStatus>) -> SyncGate {
        SyncGate::new(Some(Arc::new(FixedSync(status))))
    }

    #[test]
    fn test_absent_subsystem_allows_reconcile() {
        assert!(SyncGate::new(None).may_reconcile_now());
    }

    #[test]
    fn test_terminal_statuses_allow_reconcile() {
        assert!(gate(None).may_reconcile_now());
        assert!(gate(Some(SyncStatus::FullySynced)).may_reconcile_now());
        assert!(gate(Some(SyncStatus::Paused)).may_reconcile_now());
        assert!(gate(Some(SyncStatus::Connecting)).may_reconcile_now());
    }

    #[test]
    fn test_busy_status_blocks_reconcile() {
        let busy = gate(Some(SyncStatus::Busy("syncing-in-progress".to_string())));
        assert!(!busy.may_reconcile_now());
    }
}
