//! Database module for NavWatch.
//!
//! Provides SQLite storage with embedded migrations, and the
//! [`MonitorStore`] interface the checker and the status read path use.

mod models;
mod store;

pub use models::*;
pub use store::*;

/// Persistence operations the monitoring core depends on.
///
/// Target registration and editing belong to the admin layer; the core
/// only reads targets and writes back their cached status fields.
pub trait MonitorStore: Send + Sync {
    /// `{id, url, check_method}` of every target with monitoring enabled.
    fn list_enabled_targets(&self) -> Result<Vec<ProbeTarget>, DbError>;

    /// Persist a batch of probe outcomes in one transaction. For each record
    /// the target's cached status fields are updated and the record is
    /// appended to the probe log.
    fn record_check_results(&self, records: &[ProbeRecord]) -> Result<(), DbError>;

    /// Delete probe records checked before `cutoff` (epoch seconds).
    /// Returns the number of deleted rows.
    fn delete_probe_records_before(&self, cutoff: i64) -> Result<usize, DbError>;

    /// Enabled targets with their display name and cached status.
    fn list_monitored_services(&self) -> Result<Vec<ServiceTarget>, DbError>;

    /// The `limit` most recent records for a target, newest first.
    fn recent_probe_records(&self, target_id: i64, limit: usize) -> Result<Vec<ProbeRecord>, DbError>;

    /// Up/total counts of a target's records checked at or after `since`.
    fn uptime_counts_since(&self, target_id: i64, since: i64) -> Result<UptimeCounts, DbError>;
}
