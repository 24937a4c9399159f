//! vSphere REST response rows and their mapping to core summaries
//!
//! The REST API reports enum values as `SCREAMING_SNAKE_CASE`; they are mapped
//! to the managed-object spelling (`poweredOn`, `connected`, ...) so records
//! look the same whichever endpoint API produced them.

use serde::Deserialize;

use esxstat_core::{DatastoreSummary, HostSummary, VmSummary};

/// Row of `GET /api/vcenter/host`
#[derive(Debug, Clone, Deserialize)]
pub struct HostRow {
    pub host: String,
    pub name: String,
    pub connection_state: String,
    #[serde(default)]
    pub power_state: Option<String>,
}

/// Row of `GET /api/vcenter/datastore`
#[derive(Debug, Clone, Deserialize)]
pub struct DatastoreRow {
    pub datastore: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub ds_type: Option<String>,
    #[serde(default)]
    pub free_space: Option<u64>,
    #[serde(default)]
    pub capacity: Option<u64>,
}

/// Body of `GET /api/vcenter/datastore/{datastore}`
#[derive(Debug, Clone, Deserialize)]
pub struct DatastoreInfo {
    pub name: String,
    #[serde(default)]
    pub accessible: Option<bool>,
    #[serde(default)]
    pub free_space: Option<u64>,
}

/// Row of `GET /api/vcenter/vm`
#[derive(Debug, Clone, Deserialize)]
pub struct VmRow {
    pub vm: String,
    pub name: String,
    pub power_state: String,
    #[serde(default)]
    pub cpu_count: Option<u32>,
    #[serde(default, rename = "memory_size_MiB")]
    pub memory_size_mib: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VmCpu {
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VmMemory {
    #[serde(rename = "size_MiB")]
    pub size_mib: u64,
}

/// Body of `GET /api/vcenter/vm/{vm}`
#[derive(Debug, Clone, Deserialize)]
pub struct VmInfo {
    pub name: String,
    pub power_state: String,
    #[serde(default, rename = "guest_OS")]
    pub guest_os: Option<String>,
    #[serde(default)]
    pub cpu: Option<VmCpu>,
    #[serde(default)]
    pub memory: Option<VmMemory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalizableMessage {
    pub default_message: String,
}

/// Body of `GET /api/vcenter/vm/{vm}/guest/identity`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuestIdentity {
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub full_name: Option<LocalizableMessage>,
}

/// Body of `GET /api/vcenter/vm/{vm}/tools`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolsInfo {
    #[serde(default)]
    pub run_state: Option<String>,
}

/// Map a REST power state to its managed-object spelling
#[must_use]
pub fn power_state(raw: &str) -> String {
    match raw {
        "POWERED_ON" => "poweredOn",
        "POWERED_OFF" => "poweredOff",
        "SUSPENDED" => "suspended",
        "STANDBY" => "standBy",
        other => other,
    }
    .to_string()
}

/// Map a REST host connection state to its managed-object spelling
#[must_use]
pub fn connection_state(raw: &str) -> String {
    match raw {
        "CONNECTED" => "connected",
        "DISCONNECTED" => "disconnected",
        "NOT_RESPONDING" => "notResponding",
        other => other,
    }
    .to_string()
}

/// Map a REST tools run state to the guest tools running status
#[must_use]
pub fn tools_status(raw: &str) -> String {
    match raw {
        "RUNNING" => "guestToolsRunning",
        "NOT_RUNNING" => "guestToolsNotRunning",
        "EXECUTING_SCRIPTS" => "guestToolsExecutingScripts",
        other => other,
    }
    .to_string()
}

impl HostRow {
    /// Summary for this host; fields the REST API lacks stay empty
    #[must_use]
    pub fn into_summary(self, vm_count: Option<u32>) -> HostSummary {
        HostSummary {
            name: self.name,
            connection_state: Some(connection_state(&self.connection_state)),
            power_state: self.power_state.as_deref().map(power_state),
            vm_count,
            ..HostSummary::default()
        }
    }
}

impl DatastoreRow {
    #[must_use]
    pub fn into_summary(self, info: Option<DatastoreInfo>) -> DatastoreSummary {
        let accessible = info.as_ref().and_then(|i| i.accessible);
        let free_space_bytes = self
            .free_space
            .or_else(|| info.as_ref().and_then(|i| i.free_space));
        DatastoreSummary {
            name: self.name,
            ds_type: self.ds_type,
            capacity_bytes: self.capacity,
            free_space_bytes,
            accessible,
            ..DatastoreSummary::default()
        }
    }
}

impl VmInfo {
    #[must_use]
    pub fn into_summary(
        self,
        identity: GuestIdentity,
        tools: ToolsInfo,
        host: Option<String>,
    ) -> VmSummary {
        let guest_os = identity
            .full_name
            .map(|n| n.default_message)
            .or(self.guest_os);
        VmSummary {
            name: self.name,
            power_state: Some(power_state(&self.power_state)),
            guest_os,
            cpu_count: self.cpu.map(|c| c.count),
            memory_size_mb: self.memory.map(|m| m.size_mib),
            ip_address: identity.ip_address,
            host,
            tools_status: tools.run_state.as_deref().map(tools_status),
            ..VmSummary::default()
        }
    }
}
