//! Status aggregation: the read path behind the public status page.
//!
//! Builds one [`ServiceStatus`] per enabled target from its probe log and
//! combines the cached target statuses into an [`OverallStatus`]. Target
//! URLs never appear in the output.

mod stats;

pub use stats::*;

use crate::db::{DbError, MonitorStatus, MonitorStore, ProbeStatus, ServiceTarget};

use serde::Serialize;

/// Number of most recent records used for the base uptime, the average
/// response time and the timeline.
pub const TIMELINE_LENGTH: usize = 45;

const DAY_SECONDS: i64 = 86_400;
const MONTH_SECONDS: i64 = 30 * DAY_SECONDS;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub timestamp: i64,
    pub status: ProbeStatus,
    pub response_time: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub id: i64,
    pub name: String,
    pub uptime_percentage: f64,
    #[serde(rename = "uptime24h")]
    pub uptime_24h: f64,
    #[serde(rename = "uptime30d")]
    pub uptime_30d: f64,
    pub avg_response_time: u64,
    pub last_response_time: Option<u64>,
    pub current_status: MonitorStatus,
    pub last_checked_at: Option<i64>,
    /// Oldest first.
    pub timeline: Vec<TimelineEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub overall_status: OverallStatus,
    pub services: Vec<ServiceStatus>,
    pub last_updated: i64,
}

/// Aggregate the status of every enabled target as of `now`.
///
/// Any store error fails the whole report; partial reports are never built.
pub fn collect_status(store: &dyn MonitorStore, now: i64) -> Result<StatusReport, DbError> {
    let targets = store.list_monitored_services()?;

    let services = targets
        .iter()
        .map(|target| summarize_service(store, target, now))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StatusReport {
        overall_status: overall_status(targets.iter().map(|t| t.monitor_status)),
        services,
        last_updated: now,
    })
}

fn summarize_service(
    store: &dyn MonitorStore,
    target: &ServiceTarget,
    now: i64,
) -> Result<ServiceStatus, DbError> {
    let mut recent = store.recent_probe_records(target.id, TIMELINE_LENGTH)?;
    recent.reverse();

    let day = store.uptime_counts_since(target.id, now - DAY_SECONDS)?;
    let month = store.uptime_counts_since(target.id, now - MONTH_SECONDS)?;
    let last = recent.last();

    Ok(ServiceStatus {
        id: target.id,
        name: target.name.clone(),
        uptime_percentage: uptime_percentage(count_uptime(&recent)),
        uptime_24h: uptime_percentage(day),
        uptime_30d: uptime_percentage(month),
        avg_response_time: average_response_time(&recent),
        last_response_time: last.map(|r| r.response_time),
        current_status: target.monitor_status,
        last_checked_at: last.map(|r| r.checked_at),
        timeline: recent
            .iter()
            .map(|r| TimelineEntry {
                timestamp: r.checked_at,
                status: r.status,
                response_time: r.response_time,
            })
            .collect(),
    })
}
