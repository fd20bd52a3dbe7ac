//! Domain model for the service-type catalog.
//! - Entity definitions shared by the service, client, and server crates.
//! - Field validation helpers kept next to the types they validate.

pub mod errors;
pub mod service_type;

pub use service_type::{validate_name, CatalogWriteEntry, ServiceTypeEntry, SOURCE_TAG};
