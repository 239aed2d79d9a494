//! One monitoring cycle: probe every enabled target, persist the outcomes,
//! then sweep expired records.

use crate::db::{DbError, MonitorStore, ProbeRecord, ProbeStatus, ProbeTarget};
use crate::probe::{ProbeOutcome, Prober};

use super::retention::sweep_probe_records;

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Cycle-level failures. Probe failures never show up here.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("failed to load monitored targets: {0}")]
    LoadTargets(#[source] DbError),
    #[error("failed to persist probe results: {0}")]
    Persist(#[source] DbError),
    #[error("probe log retention sweep failed: {0}")]
    Sweep(#[source] DbError),
}

/// Counts from one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub checked: usize,
    pub up: usize,
    pub slow: usize,
    pub down: usize,
    pub swept: usize,
}

/// Runs monitoring cycles with a bounded number of concurrent probes.
pub struct Checker {
    prober: Arc<Prober>,
    max_concurrency: usize,
}

impl Checker {
    pub fn new(prober: Arc<Prober>, max_concurrency: usize) -> Self {
        Self {
            prober,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Run one cycle against `store`.
    ///
    /// Every enabled target is probed once; all outcomes are written in a
    /// single batch and the retention sweep runs after the batch commits.
    /// Store failures abort the cycle and are returned to the caller.
    pub async fn run_monitor_check(&self, store: &dyn MonitorStore) -> Result<CycleSummary, MonitorError> {
        let now = Utc::now().timestamp();
        let started = Instant::now();

        let targets = store.list_enabled_targets().map_err(MonitorError::LoadTargets)?;
        tracing::info!("Monitor check: found {} enabled targets", targets.len());

        if targets.is_empty() {
            tracing::info!("Monitor check: no enabled targets, skipping");
            return Ok(CycleSummary::default());
        }

        let outcomes = self.probe_all(targets).await;
        tracing::info!("Monitor check: completed {} probes", outcomes.len());

        let checked_at = Utc::now().timestamp();
        let records: Vec<ProbeRecord> = outcomes
            .into_iter()
            .map(|o| o.into_record(checked_at))
            .collect();

        store.record_check_results(&records).map_err(MonitorError::Persist)?;

        let swept = sweep_probe_records(store, now).map_err(MonitorError::Sweep)?;

        let summary = summarize(&records, swept);
        tracing::info!(
            "Monitor check: finished in {:?} ({} checked, {} up, {} slow, {} down, {} swept)",
            started.elapsed(),
            summary.checked,
            summary.up,
            summary.slow,
            summary.down,
            summary.swept
        );

        Ok(summary)
    }

    /// Probe all targets concurrently. One outcome is returned per target,
    /// in no particular order.
    async fn probe_all(&self, targets: Vec<ProbeTarget>) -> Vec<ProbeOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut handles = Vec::with_capacity(targets.len());

        for target in targets {
            let prober = Arc::clone(&self.prober);
            let semaphore = Arc::clone(&semaphore);
            let target_id = target.id;

            let handle = tokio::spawn(async move { run_limited(&prober, semaphore, &target).await });
            handles.push((target_id, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (target_id, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!("Probe task for target {} failed: {}", target_id, e);
                    outcomes.push(ProbeOutcome::failed(target_id, 0, format!("probe task failed: {}", e)));
                }
            }
        }

        outcomes
    }
}

/// Check `target` once a permit is available. A closed limiter is reported
/// as a `down` outcome instead of running unbounded.
async fn run_limited(prober: &Prober, semaphore: Arc<Semaphore>, target: &ProbeTarget) -> ProbeOutcome {
    let _permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => {
            tracing::error!("Concurrency limit unavailable for target {}: {}", target.id, e);
            return ProbeOutcome::failed(target.id, 0, format!("check not started: {}", e));
        }
    };
    prober.run_probe(target).await
}

fn summarize(records: &[ProbeRecord], swept: usize) -> CycleSummary {
    let count = |status: ProbeStatus| records.iter().filter(|r| r.status == status).count();
    CycleSummary {
        checked: records.len(),
        up: count(ProbeStatus::Up),
        slow: count(ProbeStatus::Slow),
        down: count(ProbeStatus::Down),
        swept,
    }
}
