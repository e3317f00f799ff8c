//! Background scheduler
//!
//! Fixed-interval tick loop driving the reconciliation engine, plus the
//! instance-generation registry that guards against duplicate timers left
//! behind by host hot-reloads. One pass runs to completion before the next
//! tick is processed; cancellation happens at tick boundaries.

use crate::config;
use crate::services::reconcile::{PassOutcome, ReconcileEngine};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Registry of plugin-instance generations. Every (re)load registers a new
/// generation, which makes tokens handed to earlier instances permanently
/// stale.
#[derive(Clone, Default)]
pub struct InstanceRegistry {
    generation: Arc<AtomicU64>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new plugin instance, superseding all earlier ones
    pub fn register(&self) -> InstanceToken {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Registered plugin instance generation {}", generation);
        InstanceToken {
            registry: Arc::clone(&self.generation),
            generation,
        }
    }
}

/// Token identifying one plugin instance's generation
pub struct InstanceToken {
    registry: Arc<AtomicU64>,
    generation: u64,
}

impl InstanceToken {
    /// Whether this instance is still the authoritative loaded one
    pub fn is_current(&self) -> bool {
        self.registry.load(Ordering::SeqCst) == self.generation
    }
}

/// Timer loop around a [`ReconcileEngine`]
pub struct ReminderScheduler {
    engine: Arc<Mutex<ReconcileEngine>>,
    running: Arc<AtomicBool>,
}

impl ReminderScheduler {
    pub fn new(engine: ReconcileEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared handle to the engine for on-demand passes (after intake,
    /// after a manual delete, after view activation)
    pub fn engine(&self) -> Arc<Mutex<ReconcileEngine>> {
        Arc::clone(&self.engine)
    }

    /// Spawn the tick loop. The task ends when the scheduler is shut down
    /// or the engine reports itself superseded.
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        let engine = Arc::clone(&self.engine);
        let running = Arc::clone(&self.running);
        tokio::spawn(async move {
            tracing::info!("Starting reminder scheduler");
            let mut ticker = interval(Duration::from_secs(config::TICK_INTERVAL_SECS));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !running.load(Ordering::SeqCst) {
                    tracing::info!("Reminder scheduler shut down");
                    break;
                }
                let outcome = engine.lock().await.run_pass();
                match outcome {
                    PassOutcome::Halted => {
                        tracing::info!("Engine halted, stopping reminder scheduler");
                        break;
                    }
                    PassOutcome::Skipped => {}
                    PassOutcome::Swept { fired, archived } => {
                        if fired > 0 || archived > 0 {
                            tracing::debug!(
                                "Pass complete: {} fired, {} archived",
                                fired,
                                archived
                            );
                        }
                    }
                }
            }
        })
    }

    /// Stop the loop at the next tick boundary. No in-flight state needs
    /// rollback: each pass is already committed or not yet run.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
