//! Response types for the API

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// One bucket of the statistics store
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BucketResponse {
    /// `hosts`, `datastores` or `vms`
    pub category: String,
    /// Last successful replacement, absent if never populated
    pub refreshed_at: Option<DateTime<Utc>>,
    pub count: usize,
    /// Records keyed by normalized name
    #[schema(value_type = Object)]
    pub records: BTreeMap<String, Value>,
}

/// A single record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordResponse {
    pub category: String,
    pub key: String,
    #[schema(value_type = Object)]
    pub record: Value,
}

/// Every bucket at once
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SnapshotResponse {
    pub hosts: BucketResponse,
    pub datastores: BucketResponse,
    pub vms: BucketResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SensorResponse {
    pub entity_id: String,
    pub name: String,
    pub category: String,
    pub key: String,
    #[schema(value_type = Option<Object>)]
    pub state: Option<Value>,
    pub unit_of_measurement: Option<String>,
    #[schema(value_type = Object)]
    pub attributes: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CycleError {
    /// `connection`, `enumeration`, `extraction` or `timeout`
    pub kind: String,
    pub category: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CycleSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Categories whose bucket was replaced
    pub refreshed: Vec<String>,
    pub errors: Vec<CycleError>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BucketStatus {
    pub category: String,
    pub records: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Poller status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    /// Friendly name
    pub name: String,
    /// Endpoint address
    pub endpoint: String,
    /// Backend used to reach the endpoint (e.g. `vsphere-rest`)
    pub client: String,
    pub monitored: Vec<String>,
    pub scan_interval_secs: u64,
    /// Seconds until the throttle admits another cycle
    pub next_poll_in_secs: u64,
    pub last_cycle: Option<CycleSummary>,
    pub buckets: Vec<BucketStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    /// Whether a cycle actually ran (false when throttled)
    pub ran: bool,
    pub cycle: Option<CycleSummary>,
}
