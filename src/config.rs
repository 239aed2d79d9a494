//! Configuration module for NavWatch.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::db::NewTarget;

use std::env;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read targets file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid targets file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for the status server (default: 8080)
    pub http_port: u16,
    /// Path to the SQLite database file (default: "navwatch.db")
    pub db_path: String,
    /// Seconds between monitoring cycles (default: 300)
    pub check_interval_secs: u64,
    /// Upper bound on probes in flight during a cycle (default: 16)
    pub max_concurrent_probes: usize,
    /// Optional JSON file of targets to register on first start
    pub targets_file: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            db_path: "navwatch.db".to_string(),
            check_interval_secs: 300,
            max_concurrent_probes: 16,
            targets_file: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `NAVWATCH_HTTP_PORT`: HTTP port (default: 8080)
    /// - `NAVWATCH_DB_PATH`: Database file path (default: "navwatch.db")
    /// - `NAVWATCH_CHECK_INTERVAL_SECS`: Cycle interval (default: 300)
    /// - `NAVWATCH_MAX_CONCURRENT_PROBES`: Probe concurrency cap (default: 16)
    /// - `NAVWATCH_TARGETS_FILE`: Seed targets file (default: unset)
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Some(port) = parse_var("NAVWATCH_HTTP_PORT") {
            cfg.http_port = port;
        }

        if let Ok(db_path) = env::var("NAVWATCH_DB_PATH") {
            cfg.db_path = db_path;
        }

        if let Some(secs) = parse_var::<u64>("NAVWATCH_CHECK_INTERVAL_SECS") {
            if secs > 0 {
                cfg.check_interval_secs = secs;
            }
        }

        if let Some(limit) = parse_var::<usize>("NAVWATCH_MAX_CONCURRENT_PROBES") {
            if limit > 0 {
                cfg.max_concurrent_probes = limit;
            }
        }

        if let Ok(path) = env::var("NAVWATCH_TARGETS_FILE") {
            if !path.is_empty() {
                cfg.targets_file = Some(path);
            }
        }

        cfg
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Read the seed targets file: a JSON array of target registrations.
pub fn load_seed_targets<P: AsRef<Path>>(path: P) -> Result<Vec<NewTarget>, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.db_path, "navwatch.db");
        assert_eq!(cfg.check_interval_secs, 300);
        assert_eq!(cfg.max_concurrent_probes, 16);
        assert!(cfg.targets_file.is_none());
    }

    #[test]
    fn test_load_seed_targets() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"name": "Search", "url": "https://search.example.com"}},
                {{"name": "Status", "url": "https://status.example.com", "checkMethod": "ping", "checkInterval": 1, "enabled": false}}
            ]"#
        )
        .unwrap();

        let targets = load_seed_targets(file.path()).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].check_method, "http_status");
        assert_eq!(targets[1].check_method, "ping");
        assert_eq!(targets[1].check_interval, 1);
        assert!(!targets[1].enabled);
    }

    #[test]
    fn test_load_seed_targets_rejects_bad_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "not a list"}}"#).unwrap();
        assert!(matches!(load_seed_targets(file.path()), Err(ConfigError::Parse(_))));
    }
}
