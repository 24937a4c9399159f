//! esxstat-api: Shared API types and schemas
//!
//! Response types and OpenAPI schema definitions served by the esxstat daemon.

pub mod responses;
