//! NavWatch - uptime monitoring for a link directory.
//!
//! Periodically probes registered URLs, keeps a bounded probe log and
//! serves aggregated availability statistics.

mod config;
mod db;
mod probe;
mod scheduler;
mod status;
mod web;

#[cfg(test)]
mod testutil;

use config::ServerConfig;
use db::{MonitorStore, Store};
use probe::{ProbeSettings, Prober};
use scheduler::{CheckScheduler, Checker};
use web::Server;

use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("navwatch=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    tracing::info!("Starting NavWatch on port {}...", cfg.http_port);
    tracing::info!("Using database at {}", cfg.db_path);

    // Initialize database
    let store = Arc::new(Store::new(&cfg.db_path)?);
    tracing::info!("Database initialized successfully");

    // Register seed targets on first start
    if let Some(path) = &cfg.targets_file {
        if store.target_count()? == 0 {
            let targets = config::load_seed_targets(path)?;
            tracing::info!("Registering {} targets from {}", targets.len(), path);
            for target in &targets {
                store.add_target(target)?;
            }
        }
    }

    let store: Arc<dyn MonitorStore> = store;

    // Start the periodic monitor check
    let prober = Arc::new(Prober::new(ProbeSettings::default())?);
    let checker = Arc::new(Checker::new(prober, cfg.max_concurrent_probes));
    let scheduler = CheckScheduler::new(
        store.clone(),
        checker,
        Duration::from_secs(cfg.check_interval_secs),
    );
    scheduler.start().await;

    // Start web server
    let server = Server::new(cfg, store);
    server.start().await?;

    scheduler.stop().await;

    Ok(())
}
