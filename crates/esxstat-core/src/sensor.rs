//! Sensor projection of the store
//!
//! Every record becomes one sensor: a primary state plus all record fields as
//! attributes.

use serde::Serialize;

use crate::config::Category;
use crate::normalize::normalize_name;
use crate::store::{BucketSnapshot, StoreSnapshot};
use crate::types::{StatValue, StatsRecord};

/// Observable entity backed by one store record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sensor {
    /// `sensor.<friendly name>_<category>_<key>`
    pub entity_id: String,
    /// Display name
    pub name: String,
    pub category: Category,
    /// Store key of the backing record
    pub key: String,
    /// Primary state, `None` when the record lacks the state field
    pub state: Option<StatValue>,
    pub unit_of_measurement: Option<&'static str>,
    pub attributes: StatsRecord,
}

/// Field used as the sensor state, with its unit
fn primary_state(
    category: Category,
    record: &StatsRecord,
) -> (Option<StatValue>, Option<&'static str>) {
    match category {
        Category::Hosts => match record.get("vm_count") {
            Some(count) => (Some(count.clone()), Some("VMs")),
            None => (record.get("connection_state").cloned(), None),
        },
        Category::Datastores => (record.get("free_space_gb").cloned(), Some("GB")),
        Category::Vms => (record.get("power_state").cloned(), None),
    }
}

/// Sensors for one bucket, ordered by key
#[must_use]
pub fn bucket_sensors(
    friendly_name: &str,
    category: Category,
    bucket: &BucketSnapshot,
) -> Vec<Sensor> {
    let prefix = normalize_name(friendly_name);
    bucket
        .records
        .iter()
        .map(|(key, record)| {
            let (state, unit_of_measurement) = primary_state(category, record);
            let display = match record.get("name") {
                Some(StatValue::Text(name)) => name.clone(),
                _ => key.clone(),
            };
            Sensor {
                entity_id: format!("sensor.{prefix}_{category}_{key}"),
                name: format!("{friendly_name} {display}"),
                category,
                key: key.clone(),
                state,
                unit_of_measurement,
                attributes: record.clone(),
            }
        })
        .collect()
}

/// Sensors for every monitored category
#[must_use]
pub fn project(
    friendly_name: &str,
    monitored: &[Category],
    snapshot: &StoreSnapshot,
) -> Vec<Sensor> {
    Category::ALL
        .into_iter()
        .filter(|c| monitored.contains(c))
        .flat_map(|c| bucket_sensors(friendly_name, c, snapshot.bucket(c)))
        .collect()
}
