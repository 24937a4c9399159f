//! Inventory and statistics type definitions

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Category;

// ============================================================================
// Inventory handles
// ============================================================================

/// Reference to one remote inventory object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Endpoint-side identifier (e.g. `host-12`, `vm-42`)
    pub id: String,
    /// Display name reported at enumeration time
    pub name: String,
}

impl ObjectRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Handle of an enumeration view that must be released through its connection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewHandle(pub String);

impl fmt::Display for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Objects of one category enumerated under the root folder
#[derive(Debug, Clone)]
pub struct InventoryView {
    /// Handle to release once the objects are read
    pub handle: ViewHandle,
    /// Category that was enumerated
    pub category: Category,
    /// Enumerated objects
    pub objects: Vec<ObjectRef>,
}

// ============================================================================
// Typed summaries
// ============================================================================

/// Host summary and runtime fields as reported by the endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostSummary {
    pub name: String,
    pub connection_state: Option<String>,
    pub power_state: Option<String>,
    /// Product version (e.g. `8.0.2`)
    pub version: Option<String>,
    pub cpu_model: Option<String>,
    pub cpu_cores: Option<u32>,
    pub cpu_threads: Option<u32>,
    /// Per-core clock speed
    pub cpu_mhz: Option<u32>,
    pub cpu_usage_mhz: Option<u32>,
    pub memory_size_bytes: Option<u64>,
    pub memory_usage_mb: Option<u64>,
    pub uptime_seconds: Option<u64>,
    pub boot_time: Option<DateTime<Utc>>,
    /// Number of VMs registered on the host
    pub vm_count: Option<u32>,
}

/// Datastore summary fields as reported by the endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatastoreSummary {
    pub name: String,
    /// Filesystem type (VMFS, NFS, vsan, ...)
    pub ds_type: Option<String>,
    pub capacity_bytes: Option<u64>,
    pub free_space_bytes: Option<u64>,
    pub accessible: Option<bool>,
    pub connected_hosts: Option<u32>,
    pub virtual_machines: Option<u32>,
}

/// Virtual machine summary fields as reported by the endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmSummary {
    pub name: String,
    pub power_state: Option<String>,
    pub guest_os: Option<String>,
    pub cpu_count: Option<u32>,
    pub memory_size_mb: Option<u64>,
    /// Guest memory actively used
    pub memory_usage_mb: Option<u64>,
    /// Host memory allocated to the VM
    pub memory_allocation_mb: Option<u64>,
    pub ip_address: Option<String>,
    /// Name of the host the VM runs on
    pub host: Option<String>,
    pub tools_status: Option<String>,
    pub uptime_seconds: Option<u64>,
}

// ============================================================================
// Statistics records
// ============================================================================

/// A single metric value
///
/// Serialized untagged so values keep their native JSON type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Bool(v) => write!(f, "{v}"),
            StatValue::Integer(v) => write!(f, "{v}"),
            StatValue::Float(v) => write!(f, "{v}"),
            StatValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for StatValue {
    fn from(value: bool) -> Self {
        StatValue::Bool(value)
    }
}

impl From<u32> for StatValue {
    fn from(value: u32) -> Self {
        StatValue::Integer(i64::from(value))
    }
}

impl From<u64> for StatValue {
    fn from(value: u64) -> Self {
        StatValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<i64> for StatValue {
    fn from(value: i64) -> Self {
        StatValue::Integer(value)
    }
}

impl From<f64> for StatValue {
    fn from(value: f64) -> Self {
        StatValue::Float(value)
    }
}

impl From<String> for StatValue {
    fn from(value: String) -> Self {
        StatValue::Text(value)
    }
}

impl From<&str> for StatValue {
    fn from(value: &str) -> Self {
        StatValue::Text(value.to_string())
    }
}

/// Metric name to value mapping for one inventory object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsRecord(BTreeMap<String, StatValue>);

impl StatsRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a metric
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StatValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Set a metric only when the value is known
    pub fn insert_opt<V: Into<StatValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&StatValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StatValue)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
