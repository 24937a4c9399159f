//! `EndpointClient` backed by the vSphere Automation REST API
//!
//! The REST API has no server-side container views, so a view is a handle
//! this connection hands out on enumeration and forgets on release. VM
//! placement needs one listing per host, so it is read in `prepare` rather
//! than inside a single object's summary.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use esxstat_core::{
    Category, Connection, DatastoreSummary, EndpointClient, EndpointConfig, HostSummary,
    InventoryView, ObjectRef, PollError, ViewHandle, VmSummary,
};

use crate::error::VsphereError;
use crate::http::RestSession;
use crate::models::{
    DatastoreInfo, DatastoreRow, GuestIdentity, HostRow, ToolsInfo, VmInfo, VmRow,
};

const HOSTS_PATH: &str = "/api/vcenter/host";
const DATASTORES_PATH: &str = "/api/vcenter/datastore";
const VMS_PATH: &str = "/api/vcenter/vm";

/// Connects to vCenter or a standalone ESXi host over REST
#[derive(Debug, Clone, Copy, Default)]
pub struct VsphereClient;

impl VsphereClient {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EndpointClient for VsphereClient {
    #[instrument(skip(self, endpoint), fields(host = %endpoint.host))]
    async fn connect(&self, endpoint: &EndpointConfig) -> Result<Box<dyn Connection>, PollError> {
        let mut session =
            RestSession::new(endpoint).map_err(|e| PollError::Connection(e.to_string()))?;
        session
            .login(&endpoint.username, &endpoint.password)
            .await
            .map_err(|e| PollError::Connection(e.to_string()))?;

        info!("connected to vSphere endpoint");
        Ok(Box::new(VsphereConnection::new(session, endpoint.timeout())))
    }

    fn client_type(&self) -> &'static str {
        "vsphere-rest"
    }
}

/// Which host runs which VM, read once per connection
#[derive(Debug, Default)]
struct Placement {
    /// VM id to host name
    vm_host: HashMap<String, String>,
    /// Host id to number of VMs
    vm_count: HashMap<String, u32>,
}

/// One logged-in REST session
#[derive(Debug)]
pub struct VsphereConnection {
    session: RestSession,
    request_timeout: Duration,
    open_views: HashMap<String, Category>,
    next_view: u64,
    placement: Option<Placement>,
}

impl VsphereConnection {
    #[must_use]
    pub fn new(session: RestSession, request_timeout: Duration) -> Self {
        Self {
            session,
            request_timeout,
            open_views: HashMap::new(),
            next_view: 0,
            placement: None,
        }
    }

    /// Number of views handed out and not yet released
    #[must_use]
    pub fn open_views(&self) -> usize {
        self.open_views.len()
    }

    /// Turn a client timeout into `PollError::Timeout`, anything else via `other`
    fn classify(
        &self,
        error: VsphereError,
        operation: &str,
        category: Option<Category>,
        other: impl FnOnce(String) -> PollError,
    ) -> PollError {
        if error.is_timeout() {
            PollError::Timeout {
                operation: operation.to_string(),
                category,
                after: self.request_timeout,
            }
        } else {
            other(error.to_string())
        }
    }

    async fn load_placement(&self) -> Result<Placement, VsphereError> {
        let hosts: Vec<HostRow> = self.session.get(HOSTS_PATH).await?;
        let mut placement = Placement::default();
        for host in hosts {
            let vms: Vec<VmRow> = self
                .session
                .get_with_query(VMS_PATH, &[("hosts", host.host.as_str())])
                .await?;
            let count = u32::try_from(vms.len()).unwrap_or(u32::MAX);
            placement.vm_count.insert(host.host.clone(), count);
            for vm in vms {
                placement.vm_host.insert(vm.vm, host.name.clone());
            }
        }
        Ok(placement)
    }

    fn vm_count(&self, host_id: &str) -> Option<u32> {
        self.placement.as_ref()?.vm_count.get(host_id).copied()
    }

    fn vm_host(&self, vm_id: &str) -> Option<String> {
        self.placement.as_ref()?.vm_host.get(vm_id).cloned()
    }

    async fn list(&self, category: Category) -> Result<Vec<ObjectRef>, VsphereError> {
        let objects = match category {
            Category::Hosts => self
                .session
                .get::<Vec<HostRow>>(HOSTS_PATH)
                .await?
                .into_iter()
                .map(|row| ObjectRef::new(row.host, row.name))
                .collect(),
            Category::Datastores => self
                .session
                .get::<Vec<DatastoreRow>>(DATASTORES_PATH)
                .await?
                .into_iter()
                .map(|row| ObjectRef::new(row.datastore, row.name))
                .collect(),
            Category::Vms => self
                .session
                .get::<Vec<VmRow>>(VMS_PATH)
                .await?
                .into_iter()
                .map(|row| ObjectRef::new(row.vm, row.name))
                .collect(),
        };
        Ok(objects)
    }

    /// Fetch an optional sub-resource, logging instead of failing
    async fn optional<T: serde::de::DeserializeOwned + Send>(&self, path: &str) -> Option<T> {
        match self.session.get(path).await {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(path, error = %e, "optional resource unavailable");
                None
            }
        }
    }
}

#[async_trait]
impl Connection for VsphereConnection {
    async fn prepare(&mut self, monitored: &[Category]) -> Result<(), PollError> {
        let needed = monitored
            .iter()
            .any(|c| matches!(c, Category::Hosts | Category::Vms));
        if !needed || self.placement.is_some() {
            return Ok(());
        }

        // Empty until the load completes, so a cancelled load is never retried
        self.placement = Some(Placement::default());
        match self.load_placement().await {
            Ok(placement) => {
                debug!(vms = placement.vm_host.len(), "read VM placement");
                self.placement = Some(placement);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to read VM placement");
                Err(self.classify(e, "prepare", None, |message| {
                    PollError::enumeration(Category::Vms, format!("VM placement: {message}"))
                }))
            }
        }
    }

    async fn enumerate(&mut self, category: Category) -> Result<InventoryView, PollError> {
        let objects = match self.list(category).await {
            Ok(objects) => objects,
            Err(e) => {
                return Err(self.classify(e, "enumerate", Some(category), |message| {
                    PollError::enumeration(category, message)
                }));
            }
        };

        self.next_view += 1;
        let handle = ViewHandle(format!("view-{category}-{}", self.next_view));
        self.open_views.insert(handle.0.clone(), category);
        debug!(category = %category, view = %handle, objects = objects.len(), "enumerated");

        Ok(InventoryView {
            handle,
            category,
            objects,
        })
    }

    async fn release(&mut self, handle: ViewHandle) -> Result<(), PollError> {
        match self.open_views.remove(&handle.0) {
            Some(category) => {
                debug!(category = %category, view = %handle, "released view");
                Ok(())
            }
            None => Err(PollError::Connection(
                VsphereError::UnknownView(handle.0).to_string(),
            )),
        }
    }

    async fn host_summary(&mut self, object: &ObjectRef) -> Result<HostSummary, PollError> {
        let category = Category::Hosts;
        let rows: Vec<HostRow> = match self
            .session
            .get_with_query(HOSTS_PATH, &[("hosts", object.id.as_str())])
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                return Err(self.classify(e, "host summary", Some(category), |message| {
                    PollError::extraction(category, &object.id, message)
                }));
            }
        };
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| PollError::extraction(category, &object.id, "host no longer listed"))?;

        Ok(row.into_summary(self.vm_count(&object.id)))
    }

    async fn datastore_summary(
        &mut self,
        object: &ObjectRef,
    ) -> Result<DatastoreSummary, PollError> {
        let category = Category::Datastores;
        let rows: Vec<DatastoreRow> = match self
            .session
            .get_with_query(DATASTORES_PATH, &[("datastores", object.id.as_str())])
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                return Err(self.classify(e, "datastore summary", Some(category), |message| {
                    PollError::extraction(category, &object.id, message)
                }));
            }
        };
        let row = rows.into_iter().next().ok_or_else(|| {
            PollError::extraction(category, &object.id, "datastore no longer listed")
        })?;

        let info: Option<DatastoreInfo> = self
            .optional(&format!("{DATASTORES_PATH}/{}", object.id))
            .await;
        Ok(row.into_summary(info))
    }

    async fn vm_summary(&mut self, object: &ObjectRef) -> Result<VmSummary, PollError> {
        let category = Category::Vms;
        let path = format!("{VMS_PATH}/{}", object.id);
        let info: VmInfo = match self.session.get(&path).await {
            Ok(info) => info,
            Err(e) => {
                return Err(self.classify(e, "vm summary", Some(category), |message| {
                    PollError::extraction(category, &object.id, message)
                }));
            }
        };

        // Guest identity and tools are only served while VMware Tools runs
        let identity: GuestIdentity = self
            .optional(&format!("{path}/guest/identity"))
            .await
            .unwrap_or_default();
        let tools: ToolsInfo = self
            .optional(&format!("{path}/tools"))
            .await
            .unwrap_or_default();
        let host = self.vm_host(&object.id);

        Ok(info.into_summary(identity, tools, host))
    }

    async fn close(&mut self) -> Result<(), PollError> {
        if !self.open_views.is_empty() {
            warn!(views = self.open_views.len(), "closing with unreleased views");
            self.open_views.clear();
        }
        self.session
            .logout()
            .await
            .map_err(|e| PollError::Connection(e.to_string()))
    }
}
