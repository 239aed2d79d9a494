//! Scheduler module for running monitoring cycles.

mod check;
mod retention;

pub use check::*;
pub use retention::*;

use crate::db::MonitorStore;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

/// Periodic trigger that runs one monitoring cycle per tick.
pub struct CheckScheduler {
    store: Arc<dyn MonitorStore>,
    checker: Arc<Checker>,
    interval: Duration,
    stop_tx: broadcast::Sender<()>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CheckScheduler {
    pub fn new(store: Arc<dyn MonitorStore>, checker: Arc<Checker>, interval: Duration) -> Self {
        let (stop_tx, _) = broadcast::channel(1);
        Self {
            store,
            checker,
            interval,
            stop_tx,
            task: Mutex::new(None),
        }
    }

    /// Start the background task. The first cycle runs immediately.
    pub async fn start(&self) {
        let store = self.store.clone();
        let checker = self.checker.clone();
        let period = self.interval;
        // Subscribed before spawning so a stop sent right after start is seen.
        let mut rx = self.stop_tx.subscribe();

        tracing::info!("Scheduler: running monitor checks every {:?}", period);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = rx.recv() => break,
                    _ = interval.tick() => {
                        if let Err(e) = checker.run_monitor_check(store.as_ref()).await {
                            tracing::error!("Scheduler: monitor check failed: {}", e);
                        }
                    }
                }
            }

            tracing::info!("Scheduler: stopped");
        });

        if let Some(previous) = self.task.lock().await.replace(handle) {
            previous.abort();
        }
    }

    /// Stop the background task and wait for it to exit. A cycle in flight
    /// runs to completion first.
    pub async fn stop(&self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.task.lock().await.take() {
            if let Err(e) = handle.await {
                tracing::error!("Scheduler: task ended abnormally: {}", e);
            }
        }
    }
}
