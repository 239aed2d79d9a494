//! SQLite database store implementation.

use rusqlite::{params, Connection, Result as SqlResult, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

use super::models::*;
use super::MonitorStore;

mod embedded {
    refinery::embed_migrations!("migrations");
}

/// Database error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("database connection lock poisoned")]
    Poisoned,
}

/// Thread-safe database store.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (or create) the database at `path` and apply pending migrations.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<(), DbError> {
        let mut conn = self.lock()?;
        let report = embedded::migrations::runner()
            .run(&mut *conn)
            .map_err(|e| DbError::Migration(e.to_string()))?;

        for migration in report.applied_migrations() {
            tracing::info!("Applied migration {}", migration);
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    // --- Target registration ---

    /// Insert a target and return its ID.
    pub fn add_target(&self, target: &NewTarget) -> Result<i64, DbError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO targets (name, url, check_method, check_interval, enabled) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                target.name,
                target.url,
                target.check_method,
                target.check_interval,
                target.enabled,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Number of registered targets, enabled or not.
    pub fn target_count(&self) -> Result<i64, DbError> {
        let conn = self.lock()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM targets", [], |r| r.get(0))?)
    }
}

impl MonitorStore for Store {
    fn list_enabled_targets(&self) -> Result<Vec<ProbeTarget>, DbError> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, url, check_method FROM targets WHERE enabled = 1 ORDER BY id")?;

        let targets = stmt
            .query_map([], |row| {
                Ok(ProbeTarget {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    check_method: row.get(2)?,
                })
            })?
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(targets)
    }

    fn record_check_results(&self, records: &[ProbeRecord]) -> Result<(), DbError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        {
            let mut update = tx.prepare(
                "UPDATE targets SET monitor_status = ?1, response_time = ?2, last_checked_at = ?3 WHERE id = ?4",
            )?;
            let mut insert = tx.prepare(
                "INSERT INTO probe_records (target_id, checked_at, status, status_code, response_time, error_message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for r in records {
                let response_time = i64::try_from(r.response_time).unwrap_or(i64::MAX);
                update.execute(params![r.status, response_time, r.checked_at, r.target_id])?;
                insert.execute(params![
                    r.target_id,
                    r.checked_at,
                    r.status,
                    r.status_code,
                    response_time,
                    r.error_message,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_probe_records_before(&self, cutoff: i64) -> Result<usize, DbError> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM probe_records WHERE checked_at < ?1",
            params![cutoff],
        )?;
        Ok(deleted)
    }

    fn list_monitored_services(&self) -> Result<Vec<ServiceTarget>, DbError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, monitor_status, response_time, last_checked_at
             FROM targets WHERE enabled = 1 ORDER BY id",
        )?;

        let services = stmt
            .query_map([], |row| {
                Ok(ServiceTarget {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    monitor_status: row.get(2)?,
                    response_time: row.get::<_, Option<i64>>(3)?.map(non_negative),
                    last_checked_at: row.get(4)?,
                })
            })?
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(services)
    }

    fn recent_probe_records(&self, target_id: i64, limit: usize) -> Result<Vec<ProbeRecord>, DbError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT target_id, checked_at, status, status_code, response_time, error_message
             FROM probe_records
             WHERE target_id = ?1
             ORDER BY checked_at DESC, id DESC
             LIMIT ?2",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![target_id, limit], map_probe_record)?
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(records)
    }

    fn uptime_counts_since(&self, target_id: i64, since: i64) -> Result<UptimeCounts, DbError> {
        let conn = self.lock()?;
        let (total, up): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status = 'up' THEN 1 ELSE 0 END), 0)
             FROM probe_records WHERE target_id = ?1 AND checked_at >= ?2",
            params![target_id, since],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(UptimeCounts {
            up: non_negative(up),
            total: non_negative(total),
        })
    }
}

fn map_probe_record(row: &Row<'_>) -> SqlResult<ProbeRecord> {
    Ok(ProbeRecord {
        target_id: row.get(0)?,
        checked_at: row.get(1)?,
        status: row.get(2)?,
        status_code: row
            .get::<_, Option<i64>>(3)?
            .and_then(|code| u16::try_from(code).ok()),
        response_time: non_negative(row.get(4)?),
        error_message: row.get(5)?,
    })
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
