//! Store and sensor endpoints

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use esxstat_api::responses::{BucketResponse, RecordResponse, SensorResponse};
use esxstat_core::{Category, normalize_name, project};

use crate::api::convert::{bucket_response, sensor_response};
use crate::api::error::{ApiError, AppError};
use crate::state::AppState;

fn parse_category(raw: &str) -> Result<Category, AppError> {
    raw.parse()
        .map_err(|_| AppError::not_found("UNKNOWN_CATEGORY", format!("unknown category: {raw}")))
}

/// Current bucket of a category
///
/// # Errors
/// Returns `AppError` if the category is unknown or a record fails to encode
#[utoipa::path(
    get,
    path = "/api/v1/{category}",
    tag = "stats",
    params(("category" = String, Path, description = "`hosts`, `datastores` or `vms`")),
    responses(
        (status = 200, description = "Bucket snapshot", body = BucketResponse),
        (status = 404, description = "Unknown category", body = ApiError),
        (status = 500, description = "Record failed to encode", body = ApiError)
    )
)]
pub async fn get_bucket(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<BucketResponse>, AppError> {
    let category = parse_category(&category)?;
    let bucket = state.store.snapshot(category).await;
    Ok(Json(bucket_response(category, &bucket)?))
}

/// One record, looked up by (normalized) object name
///
/// # Errors
/// Returns `AppError` if the category is unknown, the record is absent or it
/// fails to encode
#[utoipa::path(
    get,
    path = "/api/v1/{category}/{name}",
    tag = "stats",
    params(
        ("category" = String, Path, description = "`hosts`, `datastores` or `vms`"),
        ("name" = String, Path, description = "Object name, normalized before lookup")
    ),
    responses(
        (status = 200, description = "Record", body = RecordResponse),
        (status = 404, description = "Unknown category or record", body = ApiError),
        (status = 500, description = "Record failed to encode", body = ApiError)
    )
)]
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path((category, name)): Path<(String, String)>,
) -> Result<Json<RecordResponse>, AppError> {
    let category = parse_category(&category)?;
    let key = normalize_name(&name);
    let record = state.store.get(category, &key).await.ok_or_else(|| {
        AppError::not_found("RECORD_NOT_FOUND", format!("no {category} record named {key}"))
    })?;

    Ok(Json(RecordResponse {
        category: category.to_string(),
        key,
        record: serde_json::to_value(&record)?,
    }))
}

/// Sensor projection of every monitored bucket
///
/// # Errors
/// Returns `AppError` if a sensor fails to encode
#[utoipa::path(
    get,
    path = "/api/v1/sensors",
    tag = "stats",
    responses(
        (status = 200, description = "Sensors", body = Vec<SensorResponse>),
        (status = 500, description = "Sensor failed to encode", body = ApiError)
    )
)]
pub async fn list_sensors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SensorResponse>>, AppError> {
    let endpoint = &state.config.esxi;
    let snapshot = state.store.snapshot_all().await;
    let sensors = project(&endpoint.name, &endpoint.monitored_conditions, &snapshot);
    let body = sensors
        .iter()
        .map(sensor_response)
        .collect::<Result<_, _>>()?;
    Ok(Json(body))
}
