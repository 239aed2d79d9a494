//! Shared test fixtures.

use crate::db::{
    DbError, MonitorStore, NewTarget, ProbeRecord, ProbeStatus, ProbeTarget, ServiceTarget, Store,
    UptimeCounts,
};

use axum::{
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, get},
    Router,
};
use std::time::Duration;
use tempfile::NamedTempFile;

/// A store backed by a fresh temporary file. Keep the file handle alive for
/// as long as the store is used.
pub fn temp_store() -> (NamedTempFile, Store) {
    let tmp = NamedTempFile::new().unwrap();
    let store = Store::new(tmp.path()).unwrap();
    (tmp, store)
}

pub fn add_target(store: &Store, name: &str, url: &str) -> i64 {
    add_target_with_method(store, name, url, "http_status")
}

pub fn add_target_with_method(store: &Store, name: &str, url: &str, method: &str) -> i64 {
    store
        .add_target(&NewTarget {
            name: name.to_string(),
            url: url.to_string(),
            check_method: method.to_string(),
            check_interval: 5,
            enabled: true,
        })
        .unwrap()
}

pub fn record(target_id: i64, checked_at: i64, status: ProbeStatus, response_time: u64) -> ProbeRecord {
    ProbeRecord {
        target_id,
        checked_at,
        status,
        status_code: Some(if status == ProbeStatus::Down { 503 } else { 200 }),
        response_time,
        error_message: None,
    }
}

/// Start a local HTTP server and return its base URL.
///
/// Routes: `/ok` (200), `/missing` (404), `/error` (500), `/slow` (200 after
/// 150ms), `/hang` (200 after 5s), `/head-only` and `/get-only` (405 for any
/// other method), `/agent` (405 unless the client identifies as NavWatch),
/// `/redirect` (302 to `/ok`).
pub async fn spawn_fixture_server() -> String {
    async fn method_only(expected: Method, method: Method) -> StatusCode {
        if method == expected {
            StatusCode::OK
        } else {
            StatusCode::METHOD_NOT_ALLOWED
        }
    }

    async fn navwatch_agent_only(headers: HeaderMap) -> StatusCode {
        match headers.get(header::USER_AGENT) {
            Some(agent) if agent == crate::probe::USER_AGENT => StatusCode::OK,
            _ => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    let router = Router::new()
        .route("/ok", get(|| async { "ok" }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route("/error", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(150)).await;
                "slow"
            }),
        )
        .route(
            "/hang",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        )
        .route("/head-only", any(|m: Method| method_only(Method::HEAD, m)))
        .route("/get-only", any(|m: Method| method_only(Method::GET, m)))
        .route("/agent", any(navwatch_agent_only))
        .route(
            "/redirect",
            any(|| async { (StatusCode::FOUND, [(header::LOCATION, "/ok")]) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

/// URL of a local port with nothing listening on it.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

/// A store whose every operation fails, as if the database were gone.
pub struct FailingStore;

fn unavailable() -> DbError {
    DbError::Sqlite(rusqlite::Error::InvalidQuery)
}

impl MonitorStore for FailingStore {
    fn list_enabled_targets(&self) -> Result<Vec<ProbeTarget>, DbError> {
        Err(unavailable())
    }

    fn record_check_results(&self, _records: &[ProbeRecord]) -> Result<(), DbError> {
        Err(unavailable())
    }

    fn delete_probe_records_before(&self, _cutoff: i64) -> Result<usize, DbError> {
        Err(unavailable())
    }

    fn list_monitored_services(&self) -> Result<Vec<ServiceTarget>, DbError> {
        Err(unavailable())
    }

    fn recent_probe_records(&self, _target_id: i64, _limit: usize) -> Result<Vec<ProbeRecord>, DbError> {
        Err(unavailable())
    }

    fn uptime_counts_since(&self, _target_id: i64, _since: i64) -> Result<UptimeCounts, DbError> {
        Err(unavailable())
    }
}
