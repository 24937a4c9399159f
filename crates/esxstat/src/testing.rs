//! Test helpers shared by the daemon's unit tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use esxstat_core::{
    Bucket, Category, Connection, EndpointClient, EndpointConfig, PollError, Poller, StatsRecord,
    StatsStore,
};

use crate::config::{Config, DaemonConfig};
use crate::state::AppState;

/// Client whose every connection attempt fails
#[derive(Default)]
pub struct UnreachableClient {
    connects: AtomicUsize,
}

impl UnreachableClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EndpointClient for UnreachableClient {
    async fn connect(&self, _endpoint: &EndpointConfig) -> Result<Box<dyn Connection>, PollError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Err(PollError::Connection("connection refused".to_string()))
    }

    fn client_type(&self) -> &'static str {
        "unreachable"
    }
}

pub fn endpoint(scan_interval: u64) -> EndpointConfig {
    let mut endpoint = EndpointConfig::new("vcenter.lan", "monitor", "secret")
        .with_monitored([Category::Hosts, Category::Vms]);
    endpoint.name = "Lab ESXi".to_string();
    endpoint.scan_interval = scan_interval;
    endpoint
}

pub fn poller_with(client: Arc<UnreachableClient>, scan_interval: u64) -> Arc<Poller> {
    Arc::new(Poller::new(
        client,
        endpoint(scan_interval),
        Arc::new(StatsStore::new()),
    ))
}

pub fn record(fields: &[(&str, &str)]) -> StatsRecord {
    let mut record = StatsRecord::new();
    for (key, value) in fields {
        record.insert(*key, *value);
    }
    record
}

/// State over a store pre-filled with one host and one VM
pub async fn populated_state(client: Arc<UnreachableClient>) -> Arc<AppState> {
    let poller = poller_with(client, 60);

    let mut hosts = Bucket::new();
    let mut host = record(&[("name", "ESXi Host A"), ("connection_state", "connected")]);
    host.insert("vm_count", 1_u32);
    hosts.insert("esxi_host_a".to_string(), host);
    poller.store().replace(Category::Hosts, hosts).await;

    let mut vms = Bucket::new();
    vms.insert(
        "web_01".to_string(),
        record(&[("name", "Web 01"), ("power_state", "poweredOn")]),
    );
    poller.store().replace(Category::Vms, vms).await;

    let config = Config {
        daemon: DaemonConfig::default(),
        esxi: poller.endpoint().clone(),
    };
    Arc::new(AppState::new(poller, config))
}
