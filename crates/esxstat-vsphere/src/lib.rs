//! esxstat-vsphere: vSphere REST backend for the poller
//!
//! Implements `esxstat_core::EndpointClient` on top of the vSphere Automation
//! REST API (`/api/session`, `/api/vcenter/...`), which vCenter and recent
//! standalone ESXi hosts both serve.

pub mod client;
pub mod error;
pub mod http;
pub mod models;

pub use client::{VsphereClient, VsphereConnection};
pub use error::{Result, VsphereError};
pub use http::RestSession;
