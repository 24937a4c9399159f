//! Statistics store shared between the poller and its readers
//!
//! Each category lives in its own bucket. The poller swaps a complete bucket
//! in one step; readers take an `Arc` snapshot and never observe a bucket
//! that is half rebuilt.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::config::Category;
use crate::types::StatsRecord;

/// Records of one category keyed by normalized object name
pub type Bucket = BTreeMap<String, StatsRecord>;

/// Immutable view of one bucket
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketSnapshot {
    /// Records keyed by normalized name
    pub records: Bucket,
    /// When the bucket was last replaced, `None` if it never was
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Snapshot of every bucket
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub hosts: Arc<BucketSnapshot>,
    pub datastores: Arc<BucketSnapshot>,
    pub vms: Arc<BucketSnapshot>,
}

impl StoreSnapshot {
    /// Bucket for `category`
    #[must_use]
    pub fn bucket(&self, category: Category) -> &Arc<BucketSnapshot> {
        match category {
            Category::Hosts => &self.hosts,
            Category::Datastores => &self.datastores,
            Category::Vms => &self.vms,
        }
    }
}

/// Process-owned statistics store
///
/// Created once at startup, written only by the poller.
#[derive(Debug, Default)]
pub struct StatsStore {
    hosts: RwLock<Arc<BucketSnapshot>>,
    datastores: RwLock<Arc<BucketSnapshot>>,
    vms: RwLock<Arc<BucketSnapshot>>,
}

impl StatsStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, category: Category) -> &RwLock<Arc<BucketSnapshot>> {
        match category {
            Category::Hosts => &self.hosts,
            Category::Datastores => &self.datastores,
            Category::Vms => &self.vms,
        }
    }

    /// Current contents of one bucket
    pub async fn snapshot(&self, category: Category) -> Arc<BucketSnapshot> {
        Arc::clone(&*self.slot(category).read().await)
    }

    /// Current contents of every bucket
    pub async fn snapshot_all(&self) -> StoreSnapshot {
        StoreSnapshot {
            hosts: self.snapshot(Category::Hosts).await,
            datastores: self.snapshot(Category::Datastores).await,
            vms: self.snapshot(Category::Vms).await,
        }
    }

    /// Look up a single record by its normalized key
    pub async fn get(&self, category: Category, key: &str) -> Option<StatsRecord> {
        self.snapshot(category).await.records.get(key).cloned()
    }

    /// Swap in a freshly built bucket, dropping every previous record
    pub async fn replace(&self, category: Category, records: Bucket) {
        let snapshot = Arc::new(BucketSnapshot {
            records,
            refreshed_at: Some(Utc::now()),
        });
        *self.slot(category).write().await = snapshot;
    }
}
