//! Integration tests for the reminder notifications core
//!
//! These tests run the whole lifecycle end to end on simulated time:
//! intake wizard -> persisted store -> reconciliation passes -> sinks,
//! including the multi-device seen tracking over one shared data file.

use reminder_notifications::config;
use reminder_notifications::error::Result;
use reminder_notifications::host::{
    Clock, FileProvider, ManualClock, MemoryFileProvider, NotificationSink,
};
use reminder_notifications::services::device::resolve_device_id;
use reminder_notifications::services::{
    IntakeSelect, IntakeWizard, PassOutcome, ReconcileEngine, ReminderIntake, SyncGate,
};
use reminder_notifications::store::PersistedStore;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingSink {
    notices: Mutex<Vec<(String, i64)>>,
    desktop: Mutex<Vec<(String, String)>>,
}

impl NotificationSink for RecordingSink {
    fn notify(&self, title: &str, due_at_ms: i64, _display_seconds: u32) -> Result<()> {
        self.notices
            .lock()
            .unwrap()
            .push((title.to_string(), due_at_ms));
        Ok(())
    }

    fn notify_desktop(&self, title: &str, body: &str) -> Result<()> {
        self.desktop
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

const T0: i64 = 1_710_498_600_000; // 2024-03-15 10:30:00 UTC

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reminder_notifications=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

struct Device {
    clock: Arc<ManualClock>,
    sink: Arc<RecordingSink>,
    engine: ReconcileEngine,
}

fn device(files: &Arc<MemoryFileProvider>, start_ms: i64) -> Device {
    let clock = Arc::new(ManualClock::new(start_ms));
    let sink = Arc::new(RecordingSink::default());
    let device_id = resolve_device_id(files.as_ref(), None);
    let store = PersistedStore::open(
        files.clone() as Arc<dyn FileProvider>,
        config::DATA_FILE_NAME,
    )
    .unwrap();
    let engine = ReconcileEngine::new(
        store,
        device_id,
        SyncGate::new(None),
        clock.clone() as Arc<dyn Clock>,
        sink.clone() as Arc<dyn NotificationSink>,
    );
    Device {
        clock,
        sink,
        engine,
    }
}

/// The spec scenario: "2 minutes" is taken as a 5-second test offset; one
/// pass after 6 simulated seconds fires exactly one notification; one pass
/// after 31 more seconds archives the reminder.
#[test]
fn test_two_minute_reminder_end_to_end() {
    init_tracing();
    let files = Arc::new(MemoryFileProvider::default());
    let mut dev = device(&files, T0);
    let device_id = dev.engine.device_id().to_string();

    // Walk the wizard: title, delay kind, quantity
    let mut wizard = IntakeWizard::begin("Check the oven").unwrap();
    assert_eq!(
        wizard.select("minutes", None, dev.clock.now_ms()).unwrap(),
        IntakeSelect::Continue
    );
    let IntakeSelect::Complete(request) =
        wizard.select("2", None, dev.clock.now_ms()).unwrap()
    else {
        panic!("expected a completed wizard");
    };
    assert_eq!(request.remind_next, T0 + 5_000);

    let intake = ReminderIntake::new(device_id.clone());
    intake
        .commit(dev.engine.store_mut(), dev.clock.as_ref(), request)
        .unwrap();

    // Out-of-cycle pass right after intake: not due yet
    assert_eq!(
        dev.engine.run_pass(),
        PassOutcome::Swept {
            fired: 0,
            archived: 0
        }
    );
    assert!(dev.sink.notices.lock().unwrap().is_empty());

    // Six simulated seconds later the reminder fires exactly once
    dev.clock.advance(6_000);
    assert_eq!(
        dev.engine.run_pass(),
        PassOutcome::Swept {
            fired: 1,
            archived: 0
        }
    );
    {
        let notices = dev.sink.notices.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0], ("Check the oven".to_string(), T0 + 5_000));
    }
    assert_eq!(dev.sink.desktop.lock().unwrap().len(), 1);
    {
        let reminder = &dev.engine.store().settings().reminders[0];
        assert_eq!(reminder.completed, T0 + 6_000);
        assert_eq!(reminder.seen, vec![device_id.clone()]);
        assert_eq!(reminder.remind_prev, vec![T0 + 5_000]);
    }

    // 31 more simulated seconds: past the grace window, archived
    dev.clock.advance(31_000);
    assert_eq!(
        dev.engine.run_pass(),
        PassOutcome::Swept {
            fired: 0,
            archived: 1
        }
    );
    let settings = dev.engine.store().settings();
    assert!(settings.reminders.is_empty());
    assert_eq!(settings.archived.len(), 1);
    assert_eq!(settings.archived[0].title, "Check the oven");
    // Still exactly one notification on this device
    assert_eq!(dev.sink.notices.lock().unwrap().len(), 1);
}

/// Two devices sharing one synced data file: each fires its own local
/// notification once, and the grace window keeps the reminder active long
/// enough for the second device to see it.
#[test]
fn test_two_devices_share_one_store() {
    init_tracing();
    let files = Arc::new(MemoryFileProvider::default());

    let mut dev_a = device(&files, T0);
    let intake = ReminderIntake::new(dev_a.engine.device_id().to_string());
    let mut wizard = IntakeWizard::begin("Team sync").unwrap();
    wizard.select("minutes", None, T0).unwrap();
    let IntakeSelect::Complete(request) = wizard.select("1", None, T0).unwrap() else {
        panic!("expected a completed wizard");
    };
    intake
        .commit(dev_a.engine.store_mut(), dev_a.clock.as_ref(), request)
        .unwrap();

    // Device A fires first
    dev_a.clock.advance(61_000);
    assert_eq!(
        dev_a.engine.run_pass(),
        PassOutcome::Swept {
            fired: 1,
            archived: 0
        }
    );

    // Device B comes up 10 seconds later against the same file. The shared
    // device-id sidecar is per-plugin-folder, so give B its own identity.
    let clock_b = Arc::new(ManualClock::new(T0 + 71_000));
    let sink_b = Arc::new(RecordingSink::default());
    let store_b = PersistedStore::open(
        files.clone() as Arc<dyn FileProvider>,
        config::DATA_FILE_NAME,
    )
    .unwrap();
    let mut engine_b = ReconcileEngine::new(
        store_b,
        "device-b",
        SyncGate::new(None),
        clock_b.clone() as Arc<dyn Clock>,
        sink_b.clone() as Arc<dyn NotificationSink>,
    );

    // Still inside A's grace window: B fires its own local notification
    assert_eq!(
        engine_b.run_pass(),
        PassOutcome::Swept {
            fired: 1,
            archived: 0
        }
    );
    assert_eq!(sink_b.notices.lock().unwrap().len(), 1);
    {
        let reminder = &engine_b.store().settings().reminders[0];
        assert_eq!(reminder.seen.len(), 2);
        assert!(reminder.seen.contains(&"device-b".to_string()));
        // History entry not duplicated by the second device
        assert_eq!(reminder.remind_prev.len(), 1);
    }

    // Device A reloads B's write before its next pass and does not
    // re-notify; B's re-stamped completion ages out and A archives it
    dev_a.clock.set(T0 + 71_000 + 31_000);
    assert_eq!(
        dev_a.engine.run_pass(),
        PassOutcome::Swept {
            fired: 0,
            archived: 1
        }
    );
    assert_eq!(dev_a.sink.notices.lock().unwrap().len(), 1);
    assert!(dev_a.engine.store().settings().reminders.is_empty());
    assert_eq!(dev_a.engine.store().settings().archived.len(), 1);
}

/// save(load()) leaves the serialized document byte-identical when nothing
/// reconciliation-relevant changed in between.
#[test]
fn test_save_load_round_trip_stability() {
    init_tracing();
    let files = Arc::new(MemoryFileProvider::default());
    let mut dev = device(&files, T0);

    let intake = ReminderIntake::new(dev.engine.device_id().to_string());
    let mut wizard = IntakeWizard::begin("Water the plants").unwrap();
    wizard.select("hours", None, T0).unwrap();
    let IntakeSelect::Complete(request) = wizard.select("3", None, T0).unwrap() else {
        panic!("expected a completed wizard");
    };
    intake
        .commit(dev.engine.store_mut(), dev.clock.as_ref(), request)
        .unwrap();

    let before = files.read_all(config::DATA_FILE_NAME).unwrap().unwrap();

    let mut reopened = PersistedStore::open(
        files.clone() as Arc<dyn FileProvider>,
        config::DATA_FILE_NAME,
    )
    .unwrap();
    reopened.save().unwrap();

    let after = files.read_all(config::DATA_FILE_NAME).unwrap().unwrap();
    assert_eq!(before, after);
}
