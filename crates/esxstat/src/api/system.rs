//! Health, status and refresh endpoints

use std::sync::Arc;

use axum::{Json, extract::State};
use esxstat_api::responses::{BucketStatus, HealthResponse, RefreshResponse, StatusResponse};
use esxstat_core::Category;
use tracing::{info, warn};

use crate::api::convert::cycle_summary;
use crate::state::AppState;

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Daemon is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Poller status and per-bucket freshness
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tag = "system",
    responses((status = 200, description = "Poller status", body = StatusResponse))
)]
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let endpoint = &state.config.esxi;
    let snapshot = state.store.snapshot_all().await;
    let last_cycle = state.poller.last_report().await;

    let buckets = Category::ALL
        .into_iter()
        .map(|category| {
            let bucket = snapshot.bucket(category);
            BucketStatus {
                category: category.to_string(),
                records: bucket.records.len(),
                refreshed_at: bucket.refreshed_at,
            }
        })
        .collect();

    Json(StatusResponse {
        name: endpoint.name.clone(),
        endpoint: endpoint.host.clone(),
        client: state.poller.client_type().to_string(),
        monitored: endpoint
            .monitored_conditions
            .iter()
            .map(ToString::to_string)
            .collect(),
        scan_interval_secs: endpoint.scan_interval,
        next_poll_in_secs: state.poller.throttle().remaining().as_secs(),
        last_cycle: last_cycle.as_ref().map(cycle_summary),
        buckets,
    })
}

/// Request a poll cycle now, subject to the scan interval
#[utoipa::path(
    post,
    path = "/api/v1/refresh",
    tag = "system",
    responses((status = 200, description = "Cycle result, `ran` is false when throttled", body = RefreshResponse))
)]
pub async fn refresh(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    match state.poller.update().await {
        Some(report) => {
            info!(errors = report.errors.len(), "manual refresh completed");
            Json(RefreshResponse {
                ran: true,
                cycle: Some(cycle_summary(&report)),
            })
        }
        None => {
            warn!(
                remaining = ?state.poller.throttle().remaining(),
                "manual refresh throttled"
            );
            Json(RefreshResponse {
                ran: false,
                cycle: None,
            })
        }
    }
}
