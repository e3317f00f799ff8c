//! Services module
//!
//! Business logic of the reminder lifecycle: device identity, sync gating,
//! intake, reconciliation, and the background scheduler.

pub mod device;
pub mod intake;
pub mod reconcile;
pub mod scheduler;
pub mod sync_gate;

pub use intake::{IntakeSelect, IntakeWizard, ReminderIntake, ReminderRequest};
pub use reconcile::{PassOutcome, ReconcileEngine};
pub use scheduler::{InstanceRegistry, InstanceToken, ReminderScheduler};
pub use sync_gate::SyncGate;
