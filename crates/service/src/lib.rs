//! Business logic for service-type catalog administration.
//! - Pagination/search math for the catalog table.
//! - Keyed set reconciliation for collection-replace submits.
//! - CSV import/export of the catalog.
//! - Bulk-edit sessions tying the above together.

pub mod csv;
pub mod errors;
pub mod pagination;
pub mod reconcile;
pub mod session;
