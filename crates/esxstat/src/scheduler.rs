//! Periodic poll driver
//!
//! Ticks every `daemon.update_interval` and asks the poller for a cycle; the
//! poller's throttle decides whether one actually runs.

use std::sync::Arc;
use std::time::Duration;

use esxstat_core::Poller;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Run until `shutdown` flips to `true` or its sender is dropped
pub async fn run(poller: Arc<Poller>, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(period = ?period, "poll scheduler started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match poller.update().await {
                    Some(report) if report.is_success() => {
                        debug!(refreshed = report.refreshed.len(), "scheduled poll finished");
                    }
                    Some(report) => {
                        warn!(errors = report.errors.len(), "scheduled poll finished with errors");
                    }
                    None => {}
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("poll scheduler stopped");
}
