//! Typed extraction of statistics records from endpoint summaries
//!
//! Raw summary values are copied verbatim. Derived figures (GHz, GB, hours)
//! are added next to them, never in their place. Fields the endpoint did not
//! report are omitted from the record.

use crate::types::{DatastoreSummary, HostSummary, StatsRecord, VmSummary};

const BYTES_PER_GB: f64 = 1_073_741_824.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

#[allow(clippy::cast_precision_loss)]
fn gigabytes(bytes: u64) -> f64 {
    round_to(bytes as f64 / BYTES_PER_GB, 2)
}

#[allow(clippy::cast_precision_loss)]
fn hours(seconds: u64) -> f64 {
    round_to(seconds as f64 / SECONDS_PER_HOUR, 1)
}

/// Build the record for an ESXi host
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn host_record(summary: &HostSummary) -> StatsRecord {
    let mut record = StatsRecord::new();
    record.insert("name", summary.name.as_str());
    record.insert_opt("connection_state", summary.connection_state.clone());
    record.insert_opt("power_state", summary.power_state.clone());
    record.insert_opt("version", summary.version.clone());

    record.insert_opt("cpu_model", summary.cpu_model.clone());
    record.insert_opt("cpu_cores", summary.cpu_cores);
    record.insert_opt("cpu_threads", summary.cpu_threads);
    record.insert_opt("cpu_mhz", summary.cpu_mhz);
    record.insert_opt("cpu_usage_mhz", summary.cpu_usage_mhz);
    if let (Some(mhz), Some(cores)) = (summary.cpu_mhz, summary.cpu_cores) {
        let total = f64::from(mhz) * f64::from(cores) / 1000.0;
        record.insert("cpu_total_ghz", round_to(total, 1));
    }
    if let Some(usage) = summary.cpu_usage_mhz {
        record.insert("cpu_usage_ghz", round_to(f64::from(usage) / 1000.0, 1));
    }

    record.insert_opt("memory_size_bytes", summary.memory_size_bytes);
    record.insert_opt("memory_usage_mb", summary.memory_usage_mb);
    if let Some(bytes) = summary.memory_size_bytes {
        record.insert("memory_total_gb", gigabytes(bytes));
    }
    if let Some(mb) = summary.memory_usage_mb {
        record.insert("memory_usage_gb", round_to(mb as f64 / 1024.0, 2));
    }

    record.insert_opt("uptime_seconds", summary.uptime_seconds);
    record.insert_opt("uptime_hours", summary.uptime_seconds.map(hours));
    record.insert_opt("boot_time", summary.boot_time.map(|t| t.to_rfc3339()));
    record.insert_opt("vm_count", summary.vm_count);
    record
}

/// Build the record for a datastore
#[must_use]
pub fn datastore_record(summary: &DatastoreSummary) -> StatsRecord {
    let mut record = StatsRecord::new();
    record.insert("name", summary.name.as_str());
    record.insert_opt("type", summary.ds_type.clone());
    record.insert_opt("capacity_bytes", summary.capacity_bytes);
    record.insert_opt("free_space_bytes", summary.free_space_bytes);
    record.insert_opt("total_space_gb", summary.capacity_bytes.map(gigabytes));
    record.insert_opt("free_space_gb", summary.free_space_bytes.map(gigabytes));
    record.insert_opt("accessible", summary.accessible);
    record.insert_opt("connected_hosts", summary.connected_hosts);
    record.insert_opt("virtual_machines", summary.virtual_machines);
    record
}

/// Build the record for a virtual machine
#[must_use]
pub fn vm_record(summary: &VmSummary) -> StatsRecord {
    let mut record = StatsRecord::new();
    record.insert("name", summary.name.as_str());
    record.insert_opt("power_state", summary.power_state.clone());
    record.insert_opt("guest_os", summary.guest_os.clone());
    record.insert_opt("cpu_count", summary.cpu_count);
    record.insert_opt("memory_size_mb", summary.memory_size_mb);
    record.insert_opt("memory_usage_mb", summary.memory_usage_mb);
    record.insert_opt("memory_allocation_mb", summary.memory_allocation_mb);
    record.insert_opt("ip_address", summary.ip_address.clone());
    record.insert_opt("host", summary.host.clone());
    record.insert_opt("tools_status", summary.tools_status.clone());
    record.insert_opt("uptime_hours", summary.uptime_seconds.map(hours));
    record
}
