//! esxstat daemon
//!
//! Polls an ESXi host or vCenter on a timer, keeps the latest statistics in
//! memory and serves them over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use esxstat_api::responses::SnapshotResponse;
use esxstat_core::{Category, Poller, StatsStore};
use esxstat_vsphere::VsphereClient;
use eyre::WrapErr;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod router;
mod scheduler;
mod startup;
mod state;
#[cfg(test)]
mod testing;

use crate::api::convert::bucket_response;
use crate::config::Config;
use crate::state::AppState;

/// ESXi/vCenter statistics poller
#[derive(Debug, Parser)]
#[command(name = "esxstat", version, about)]
struct Cli {
    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run one poll cycle, print the collected statistics and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    init_tracing(&config.daemon.log_level);

    startup::log_banner();
    startup::check_required_files(&config.daemon.required_files)?;

    let store = Arc::new(StatsStore::new());
    let poller = Arc::new(Poller::new(
        Arc::new(VsphereClient::new()),
        config.esxi.clone(),
        store,
    ));
    info!(
        endpoint = %config.esxi.host,
        monitored = ?config.esxi.monitored_conditions,
        scan_interval = config.esxi.scan_interval,
        "poller configured"
    );

    if cli.once {
        return run_once(&poller).await;
    }
    serve(poller, config).await
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_once(poller: &Poller) -> Result<()> {
    if let Some(report) = poller.update().await {
        for e in &report.errors {
            error!(kind = e.kind(), error = %e, "poll error");
        }
    }

    let snapshot = poller.store().snapshot_all().await;
    let body = SnapshotResponse {
        hosts: bucket_response(Category::Hosts, &snapshot.hosts)?,
        datastores: bucket_response(Category::Datastores, &snapshot.datastores)?,
        vms: bucket_response(Category::Vms, &snapshot.vms)?,
    };
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn serve(poller: Arc<Poller>, config: Config) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = tokio::spawn(scheduler::run(
        Arc::clone(&poller),
        config.daemon.update_interval(),
        shutdown_rx,
    ));

    let bind = config.daemon.bind.clone();
    let app = router::create_router(Arc::new(AppState::new(poller, config)));
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .wrap_err_with(|| format!("failed to bind {bind}"))?;
    info!(addr = %bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The receiver may already be gone if the scheduler exited
    let _ = shutdown_tx.send(true);
    scheduler.await?;
    info!("esxstat stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
