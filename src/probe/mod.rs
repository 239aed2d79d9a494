//! Probe module for availability checks.
//!
//! A probe performs exactly one HTTP request against a target and always
//! produces a [`ProbeOutcome`]; transport failures are captured as data.

mod http;

pub use http::*;

use crate::db::{ProbeRecord, ProbeStatus, ProbeTarget};

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Per-request timeout.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
/// Successful responses at or above this latency are classified as slow.
pub const SLOW_THRESHOLD_MS: u64 = 3_000;
/// Identifying header sent with every probe.
pub const USER_AGENT: &str = "NavWatch-Monitor/1.0";

/// Probe error types.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("unsupported check method: {0}")]
    UnsupportedMethod(String),
}

/// How a target is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMethod {
    /// HEAD request; only the status line and headers are fetched.
    HttpStatus,
    /// Full GET request. ICMP is not available to the checker, so this is a
    /// connectivity approximation rather than a real ping, and currently
    /// behaves like a GET-based status check.
    Ping,
}

impl CheckMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckMethod::HttpStatus => "http_status",
            CheckMethod::Ping => "ping",
        }
    }
}

impl fmt::Display for CheckMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckMethod {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http_status" => Ok(CheckMethod::HttpStatus),
            "ping" => Ok(CheckMethod::Ping),
            other => Err(ProbeError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// Probe tuning knobs.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub timeout: Duration,
    pub slow_threshold_ms: u64,
    /// Upper bound of the random delay taken before the timer starts.
    pub max_jitter: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: PROBE_TIMEOUT,
            slow_threshold_ms: SLOW_THRESHOLD_MS,
            max_jitter: Duration::from_millis(100),
        }
    }
}

/// Result of one probe against one target.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub target_id: i64,
    pub status: ProbeStatus,
    pub status_code: Option<u16>,
    pub response_time: u64,
    pub error_message: Option<String>,
}

impl ProbeOutcome {
    /// A `down` outcome without a response.
    pub fn failed(target_id: i64, response_time: u64, error: impl Into<String>) -> Self {
        Self {
            target_id,
            status: ProbeStatus::Down,
            status_code: None,
            response_time,
            error_message: Some(error.into()),
        }
    }

    pub fn into_record(self, checked_at: i64) -> ProbeRecord {
        ProbeRecord {
            target_id: self.target_id,
            checked_at,
            status: self.status,
            status_code: self.status_code,
            response_time: self.response_time,
            error_message: self.error_message,
        }
    }
}

/// Executes probes with a shared HTTP client.
pub struct Prober {
    client: reqwest::Client,
    settings: ProbeSettings,
}

impl Prober {
    pub fn new(settings: ProbeSettings) -> Result<Self, ProbeError> {
        let client = build_client(settings.timeout)?;
        Ok(Self { client, settings })
    }

    /// Check a single target. Never fails; every error becomes a `down`
    /// outcome carrying the elapsed time and the error message.
    pub async fn run_probe(&self, target: &ProbeTarget) -> ProbeOutcome {
        // Add jitter to avoid thundering herd
        let max_jitter = self.settings.max_jitter.as_millis() as u64;
        if max_jitter > 0 {
            let jitter = rand::random::<u64>() % max_jitter;
            tokio::time::sleep(Duration::from_millis(jitter)).await;
        }

        let start = Instant::now();
        let result = match target.check_method.parse::<CheckMethod>() {
            Ok(method) => send_check(&self.client, method, &target.url, self.settings.timeout)
                .await
                .map(|code| (method, code)),
            Err(e) => Err(e),
        };
        let response_time = elapsed_ms(start);

        match result {
            Ok((method, code)) => {
                let status = classify(code, response_time, self.settings.slow_threshold_ms);
                tracing::debug!(
                    "Target {} is {} ({} returned {} in {}ms)",
                    target.id,
                    status,
                    method,
                    code,
                    response_time
                );
                ProbeOutcome {
                    target_id: target.id,
                    status,
                    status_code: Some(code),
                    response_time,
                    error_message: None,
                }
            }
            Err(e) => {
                tracing::debug!("Probe failed for target {}: {}", target.id, e);
                ProbeOutcome::failed(target.id, response_time, e.to_string())
            }
        }
    }
}

/// Classify a received response.
pub fn classify(status_code: u16, response_time_ms: u64, slow_threshold_ms: u64) -> ProbeStatus {
    if !(200..300).contains(&status_code) {
        ProbeStatus::Down
    } else if response_time_ms >= slow_threshold_ms {
        ProbeStatus::Slow
    } else {
        ProbeStatus::Up
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
