//! esxstat-core: Poll cycle and statistics store
//!
//! Polls an ESXi/vCenter endpoint through the `EndpointClient` capability,
//! extracts typed per-object statistics and keeps them in a bucketed store
//! that downstream readers consume as sensors.

pub mod config;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod poller;
pub mod sensor;
pub mod store;
pub mod throttle;
pub mod traits;
pub mod types;

pub use config::{Category, EndpointConfig};
pub use error::{ConfigError, PollError};
pub use extract::{datastore_record, host_record, vm_record};
pub use normalize::normalize_name;
pub use poller::{BucketRefresh, CycleReport, Poller};
pub use sensor::{Sensor, bucket_sensors, project};
pub use store::{Bucket, BucketSnapshot, StatsStore, StoreSnapshot};
pub use throttle::Throttle;
pub use traits::{Connection, EndpointClient};
pub use types::{
    DatastoreSummary, HostSummary, InventoryView, ObjectRef, StatValue, StatsRecord, ViewHandle,
    VmSummary,
};
