//! Endpoint capability traits
//!
//! The poller only talks to the management endpoint through these traits, so
//! any SDK or protocol can back them.

use async_trait::async_trait;

use crate::config::{Category, EndpointConfig};
use crate::error::PollError;
use crate::types::{DatastoreSummary, HostSummary, InventoryView, ObjectRef, ViewHandle, VmSummary};

/// Opens connections to a management endpoint
#[async_trait]
pub trait EndpointClient: Send + Sync {
    /// Authenticate and open a fresh connection
    async fn connect(&self, endpoint: &EndpointConfig) -> Result<Box<dyn Connection>, PollError>;

    /// Short name of the backend, logged with every connection
    fn client_type(&self) -> &'static str;
}

/// One authenticated session, used for a single poll cycle
#[async_trait]
pub trait Connection: Send {
    /// Read data shared across categories before any enumeration
    ///
    /// Runs once per connection as its own bounded step. A failure or an
    /// interrupted run must leave the connection usable; summaries then go
    /// without the cross-category fields.
    async fn prepare(&mut self, _monitored: &[Category]) -> Result<(), PollError> {
        Ok(())
    }

    /// List every object of `category` under the root folder, recursively
    async fn enumerate(&mut self, category: Category) -> Result<InventoryView, PollError>;

    /// Release an enumeration view; must be called for every view returned
    async fn release(&mut self, handle: ViewHandle) -> Result<(), PollError>;

    async fn host_summary(&mut self, object: &ObjectRef) -> Result<HostSummary, PollError>;

    async fn datastore_summary(
        &mut self,
        object: &ObjectRef,
    ) -> Result<DatastoreSummary, PollError>;

    async fn vm_summary(&mut self, object: &ObjectRef) -> Result<VmSummary, PollError>;

    /// End the session
    async fn close(&mut self) -> Result<(), PollError>;
}
