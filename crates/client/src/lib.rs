//! Client for the remote Web API holding the service-type collection.
//! - `CatalogClient` is the seam the service and server crates depend on.
//! - `WebApiClient` speaks HTTP/JSON; `MemoryCatalog` backs tests and local
//!   development without a network.

pub mod catalog;
pub mod errors;
pub mod memory;

pub use catalog::{CatalogClient, WebApiClient};
pub use errors::ClientError;
pub use memory::MemoryCatalog;
