//! HTTP router configuration

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api::{ApiDoc, stats, system};
use crate::state::AppState;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // System endpoints
        .route("/health", get(system::health))
        .route("/api/v1/status", get(system::status))
        .route("/api/v1/refresh", post(system::refresh))
        // Statistics
        .route("/api/v1/sensors", get(stats::list_sensors))
        .route("/api/v1/{category}", get(stats::get_bucket))
        .route("/api/v1/{category}/{name}", get(stats::get_record))
        // API docs
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .with_state(state)
}
