//! NovelForge Sentinel server
//!
//! Serves the licensing, device-binding, account and security API over
//! HTTP and runs the scheduled threat scan.
//!
//! Usage:
//!   novelforge-server --database /var/lib/novelforge/sentinel.db --listen 0.0.0.0:8080

use anyhow::{Context, Result};
use clap::Parser;
use novelforge_monitor::ScanConfig;
use novelforge_server::{AppState, build_router, spawn_scheduled_scan};
use novelforge_storage::SqliteStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "novelforge-server")]
#[command(about = "NovelForge Sentinel licensing and security server")]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, env = "NOVELFORGE_DATABASE")]
    database: PathBuf,

    /// Address to serve HTTP on
    #[arg(short, long, env = "NOVELFORGE_LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,

    /// Seconds between scheduled threat scans (0 disables)
    #[arg(long, env = "NOVELFORGE_SCAN_INTERVAL_SECS", default_value = "300")]
    scan_interval_secs: u64,

    /// Trailing window examined by each scan, in seconds
    #[arg(long, default_value = "3600")]
    scan_window_secs: u64,

    /// Login failures from one address that count as brute force
    #[arg(long, default_value = "5")]
    brute_force_threshold: usize,

    /// AI calls by one account that count as abuse
    #[arg(long, default_value = "100")]
    api_abuse_threshold: usize,

    /// Device activations by one account that count as suspicious
    #[arg(long, default_value = "5")]
    activation_threshold: usize,

    /// Record every detected threat, even if an unresolved one is already open
    #[arg(long)]
    no_suppress_duplicates: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            window_secs: self.scan_window_secs,
            brute_force_threshold: self.brute_force_threshold,
            api_abuse_threshold: self.api_abuse_threshold,
            activation_threshold: self.activation_threshold,
            suppress_duplicates: !self.no_suppress_duplicates,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("NovelForge Sentinel starting...");
    let store = SqliteStore::open(&args.database)
        .with_context(|| format!("Failed to open database at {}", args.database.display()))?;
    info!(database = %args.database.display(), "database ready");

    let state = AppState::new(store, args.scan_config());

    if args.scan_interval_secs > 0 {
        spawn_scheduled_scan(state.clone(), Duration::from_secs(args.scan_interval_secs));
    } else {
        warn!("scheduled threat scan disabled");
    }

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;
    info!("HTTP API listening on {}", args.listen);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("NovelForge Sentinel stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
