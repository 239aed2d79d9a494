//! Database model types.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A status string that does not belong to the expected vocabulary.
#[derive(Error, Debug)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

/// Outcome of a single completed probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Up,
    Down,
    Slow,
}

impl ProbeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStatus::Up => "up",
            ProbeStatus::Down => "down",
            ProbeStatus::Slow => "slow",
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProbeStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(ProbeStatus::Up),
            "down" => Ok(ProbeStatus::Down),
            "slow" => Ok(ProbeStatus::Slow),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Cached status on a target row. `Unknown` until the first cycle writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorStatus {
    Up,
    Down,
    Slow,
    #[default]
    Unknown,
}

impl From<ProbeStatus> for MonitorStatus {
    fn from(status: ProbeStatus) -> Self {
        match status {
            ProbeStatus::Up => MonitorStatus::Up,
            ProbeStatus::Down => MonitorStatus::Down,
            ProbeStatus::Slow => MonitorStatus::Slow,
        }
    }
}

impl FromStr for MonitorStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(MonitorStatus::Unknown),
            other => other.parse::<ProbeStatus>().map(MonitorStatus::from),
        }
    }
}

impl ToSql for ProbeStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ProbeStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl FromSql for MonitorStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// The slice of a target row the checker needs to probe it.
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub id: i64,
    pub url: String,
    pub check_method: String,
}

/// Target metadata as seen by the status read path. The URL is
/// intentionally absent.
#[derive(Debug, Clone)]
pub struct ServiceTarget {
    pub id: i64,
    pub name: String,
    pub monitor_status: MonitorStatus,
    pub response_time: Option<u64>,
    pub last_checked_at: Option<i64>,
}

/// A target registration, as written by start-up seeding.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTarget {
    pub name: String,
    pub url: String,
    #[serde(default = "default_check_method")]
    pub check_method: String,
    /// Minutes. Informational only; the trigger drives the real cadence.
    #[serde(default = "default_check_interval")]
    pub check_interval: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_check_method() -> String {
    "http_status".to_string()
}

fn default_check_interval() -> u32 {
    5
}

fn default_enabled() -> bool {
    true
}

/// One persisted probe outcome. Immutable once written.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRecord {
    pub target_id: i64,
    /// Epoch seconds.
    pub checked_at: i64,
    pub status: ProbeStatus,
    pub status_code: Option<u16>,
    /// Milliseconds, measured up to the failure point for failed probes.
    pub response_time: u64,
    pub error_message: Option<String>,
}

/// Up/total counts over a time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UptimeCounts {
    pub up: u64,
    pub total: u64,
}
