//! API route handlers

pub mod convert;
pub mod error;
pub mod stats;
pub mod system;

use esxstat_api::responses::{
    BucketResponse, BucketStatus, CycleError, CycleSummary, HealthResponse, RecordResponse,
    RefreshResponse, SensorResponse, StatusResponse,
};
use utoipa::OpenApi;

use error::ApiError;

/// OpenAPI document served at `/docs`
#[derive(OpenApi)]
#[openapi(
    info(
        title = "esxstat",
        description = "Statistics polled from an ESXi host or vCenter"
    ),
    paths(
        system::health,
        system::status,
        system::refresh,
        stats::get_bucket,
        stats::get_record,
        stats::list_sensors,
    ),
    components(schemas(
        ApiError,
        HealthResponse,
        StatusResponse,
        BucketStatus,
        CycleSummary,
        CycleError,
        RefreshResponse,
        BucketResponse,
        RecordResponse,
        SensorResponse,
    )),
    tags(
        (name = "system", description = "Daemon health and poll control"),
        (name = "stats", description = "Collected statistics")
    )
)]
pub struct ApiDoc;
