//! Throttled poll cycle
//!
//! One cycle opens a connection and lets it read shared data, then for every
//! monitored category enumerates the inventory, releases the view, extracts a
//! record per object and swaps the category's bucket. A failing category keeps
//! its previous bucket and does not stop the categories after it.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{Category, EndpointConfig};
use crate::error::PollError;
use crate::extract::{datastore_record, host_record, vm_record};
use crate::normalize::normalize_name;
use crate::store::{Bucket, StatsStore};
use crate::throttle::Throttle;
use crate::traits::{Connection, EndpointClient};
use crate::types::{InventoryView, ObjectRef, StatsRecord};

/// Bucket replaced during a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketRefresh {
    pub category: Category,
    /// Number of records in the new bucket
    pub records: usize,
}

/// Outcome of one executed poll cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Buckets that were replaced, in poll order
    pub refreshed: Vec<BucketRefresh>,
    /// Errors logged during the cycle
    pub errors: Vec<PollError>,
}

impl CycleReport {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            refreshed: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Whether the cycle finished without any error
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether `category`'s bucket was replaced
    #[must_use]
    pub fn refreshed(&self, category: Category) -> bool {
        self.refreshed.iter().any(|r| r.category == category)
    }
}

/// Drives poll cycles against one endpoint and feeds the store
pub struct Poller {
    client: Arc<dyn EndpointClient>,
    endpoint: EndpointConfig,
    store: Arc<StatsStore>,
    throttle: Throttle,
    /// Held for the duration of a cycle
    running: Mutex<()>,
    last_report: RwLock<Option<CycleReport>>,
}

impl Poller {
    /// Create a poller throttled to the endpoint's `scan_interval`
    pub fn new(
        client: Arc<dyn EndpointClient>,
        endpoint: EndpointConfig,
        store: Arc<StatsStore>,
    ) -> Self {
        let throttle = Throttle::new(endpoint.scan_interval());
        Self {
            client,
            endpoint,
            store,
            throttle,
            running: Mutex::new(()),
            last_report: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    #[must_use]
    pub fn store(&self) -> &Arc<StatsStore> {
        &self.store
    }

    /// Backend name of the endpoint client
    #[must_use]
    pub fn client_type(&self) -> &'static str {
        self.client.client_type()
    }

    #[must_use]
    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    /// Report of the most recent executed cycle
    pub async fn last_report(&self) -> Option<CycleReport> {
        self.last_report.read().await.clone()
    }

    /// Run a poll cycle unless one ran within the throttle window
    ///
    /// Returns `None` without touching the endpoint or the store when the
    /// call was suppressed. Errors inside the cycle are logged and reported,
    /// never returned.
    #[instrument(skip(self), fields(endpoint = %self.endpoint.host))]
    pub async fn update(&self) -> Option<CycleReport> {
        // Lock before claiming the window so a suppressed call cannot delay
        // the next real cycle
        let Ok(_running) = self.running.try_lock() else {
            debug!("poll cycle already running");
            return None;
        };
        if !self.throttle.attempt() {
            debug!(remaining = ?self.throttle.remaining(), "poll throttled");
            return None;
        }

        let report = self.run_cycle().await;
        *self.last_report.write().await = Some(report.clone());
        Some(report)
    }

    async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::new();

        let connect = self.client.connect(&self.endpoint);
        let mut connection = match self.bounded("connect", None, connect).await {
            Ok(connection) => connection,
            Err(e) => {
                error!(client = self.client.client_type(), error = %e, "poll cycle aborted");
                report.errors.push(e);
                report.finished_at = Utc::now();
                return report;
            }
        };
        debug!(client = self.client.client_type(), "connected");

        let prepare = connection.prepare(&self.endpoint.monitored_conditions);
        if let Err(e) = self.bounded("prepare", None, prepare).await {
            warn!(error = %e, "connection preparation failed, continuing without it");
            report.errors.push(e);
        }

        for category in Category::ALL {
            if !self.endpoint.monitors(category) {
                continue;
            }
            match self.refresh_category(connection.as_mut(), category).await {
                Ok(records) => report.refreshed.push(BucketRefresh { category, records }),
                Err(e) => {
                    error!(
                        category = %category,
                        error = %e,
                        "category refresh failed, keeping previous data"
                    );
                    report.errors.push(e);
                }
            }
        }

        if let Err(e) = self.bounded("close", None, connection.close()).await {
            warn!(error = %e, "failed to close endpoint connection");
        }

        report.finished_at = Utc::now();
        info!(
            refreshed = report.refreshed.len(),
            errors = report.errors.len(),
            "poll cycle completed"
        );
        report
    }

    async fn refresh_category(
        &self,
        connection: &mut dyn Connection,
        category: Category,
    ) -> Result<usize, PollError> {
        let enumerate = connection.enumerate(category);
        let InventoryView {
            handle, objects, ..
        } = self.bounded("enumerate", Some(category), enumerate).await?;

        let release = connection.release(handle);
        self.bounded("release view", Some(category), release).await?;

        let mut records = Bucket::new();
        for object in &objects {
            let (key, record) = self.extract(connection, category, object).await?;
            debug!(category = %category, object = %key, "collected stats");
            if records.insert(key.clone(), record).is_some() {
                warn!(category = %category, object = %key, "duplicate name, keeping last");
            }
        }

        let count = records.len();
        self.store.replace(category, records).await;
        info!(category = %category, records = count, "bucket replaced");
        Ok(count)
    }

    async fn extract(
        &self,
        connection: &mut dyn Connection,
        category: Category,
        object: &ObjectRef,
    ) -> Result<(String, StatsRecord), PollError> {
        let (name, record) = match category {
            Category::Hosts => {
                let fetch = connection.host_summary(object);
                let summary = self.bounded("host summary", Some(category), fetch).await?;
                (summary.name.clone(), host_record(&summary))
            }
            Category::Datastores => {
                let fetch = connection.datastore_summary(object);
                let summary = self
                    .bounded("datastore summary", Some(category), fetch)
                    .await?;
                (summary.name.clone(), datastore_record(&summary))
            }
            Category::Vms => {
                let fetch = connection.vm_summary(object);
                let summary = self.bounded("vm summary", Some(category), fetch).await?;
                (summary.name.clone(), vm_record(&summary))
            }
        };

        let key = normalize_name(&name);
        if key.is_empty() {
            return Err(PollError::extraction(
                category,
                &object.id,
                "object has no display name",
            ));
        }
        Ok((key, record))
    }

    /// Apply the endpoint timeout to one call
    async fn bounded<T>(
        &self,
        operation: &str,
        category: Option<Category>,
        call: impl Future<Output = Result<T, PollError>>,
    ) -> Result<T, PollError> {
        let after = self.endpoint.timeout();
        tokio::time::timeout(after, call)
            .await
            .map_err(|_| PollError::Timeout {
                operation: operation.to_string(),
                category,
                after,
            })?
    }
}
