//! Retention sweep for the probe log.

use crate::db::{DbError, MonitorStore};

/// Probe records older than this many days are deleted.
pub const RETENTION_DAYS: i64 = 90;

const SECONDS_PER_DAY: i64 = 86_400;

/// Oldest `checked_at` that survives a sweep at `now`.
pub fn retention_cutoff(now: i64) -> i64 {
    now - RETENTION_DAYS * SECONDS_PER_DAY
}

/// Delete every probe record older than the retention horizon.
///
/// Returns the number of deleted records; a second sweep with no new
/// records in between deletes nothing.
pub fn sweep_probe_records(store: &dyn MonitorStore, now: i64) -> Result<usize, DbError> {
    let deleted = store.delete_probe_records_before(retention_cutoff(now))?;
    if deleted > 0 {
        tracing::info!("Retention: deleted {} probe records older than {} days", deleted, RETENTION_DAYS);
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ProbeStatus;
    use crate::testutil::{add_target, record, temp_store};

    const NOW: i64 = 1_750_000_000;

    fn days_ago(days: i64) -> i64 {
        NOW - days * SECONDS_PER_DAY
    }

    #[test]
    fn test_sweep_deletes_only_records_past_horizon() {
        let (_tmp, store) = temp_store();
        let id = add_target(&store, "Wiki", "https://wiki.example.com");

        store
            .record_check_results(&[
                record(id, days_ago(200), ProbeStatus::Up, 80),
                record(id, days_ago(95), ProbeStatus::Down, 10_000),
                record(id, days_ago(10), ProbeStatus::Up, 90),
            ])
            .unwrap();

        assert_eq!(sweep_probe_records(&store, NOW).unwrap(), 2);

        let remaining = store.recent_probe_records(id, 45).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].checked_at, days_ago(10));
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let (_tmp, store) = temp_store();
        let id = add_target(&store, "Wiki", "https://wiki.example.com");

        store
            .record_check_results(&[
                record(id, days_ago(120), ProbeStatus::Up, 80),
                record(id, days_ago(1), ProbeStatus::Up, 80),
            ])
            .unwrap();

        assert_eq!(sweep_probe_records(&store, NOW).unwrap(), 1);
        assert_eq!(sweep_probe_records(&store, NOW).unwrap(), 0);
    }

    #[test]
    fn test_record_exactly_at_horizon_is_kept() {
        let (_tmp, store) = temp_store();
        let id = add_target(&store, "Wiki", "https://wiki.example.com");

        store
            .record_check_results(&[record(id, retention_cutoff(NOW), ProbeStatus::Up, 80)])
            .unwrap();

        assert_eq!(sweep_probe_records(&store, NOW).unwrap(), 0);
    }
}
