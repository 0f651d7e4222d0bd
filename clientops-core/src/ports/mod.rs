//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. Services depend
//! only on these traits, not on a concrete store.

mod store;

pub use store::{CatalogStore, ReportStore, TableSink, TableSource, UserStore};
