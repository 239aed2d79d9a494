//! Uptime and latency arithmetic.

use crate::db::{MonitorStatus, ProbeRecord, ProbeStatus, UptimeCounts};

use serde::Serialize;

/// System-wide status derived from each target's cached status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Operational,
    Partial,
    Down,
}

/// Share of `up` records as a percentage with one decimal place.
/// Zero when there are no records.
pub fn uptime_percentage(counts: UptimeCounts) -> f64 {
    if counts.total == 0 {
        return 0.0;
    }
    (counts.up as f64 / counts.total as f64 * 1000.0).round() / 10.0
}

pub fn count_uptime(records: &[ProbeRecord]) -> UptimeCounts {
    UptimeCounts {
        up: records.iter().filter(|r| r.status == ProbeStatus::Up).count() as u64,
        total: records.len() as u64,
    }
}

/// Mean response time of the `up` and `slow` records, rounded to the
/// nearest millisecond. Failed probes are left out.
pub fn average_response_time(records: &[ProbeRecord]) -> u64 {
    let (sum, count) = records
        .iter()
        .filter(|r| r.status != ProbeStatus::Down)
        .fold((0u128, 0u128), |(sum, count), r| {
            (sum + u128::from(r.response_time), count + 1)
        });

    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as u64
}

/// `down` when at least half of the targets are down, `partial` when some
/// are, `operational` otherwise.
pub fn overall_status<I>(statuses: I) -> OverallStatus
where
    I: IntoIterator<Item = MonitorStatus>,
{
    let (down, total) = statuses.into_iter().fold((0usize, 0usize), |(down, total), s| {
        (down + usize::from(s == MonitorStatus::Down), total + 1)
    });

    if down == 0 {
        OverallStatus::Operational
    } else if down * 2 < total {
        OverallStatus::Partial
    } else {
        OverallStatus::Down
    }
}
