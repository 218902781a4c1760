//! Outbound ports - Interfaces that the application requires from external systems

mod creature_catalog_port;

pub use creature_catalog_port::{CatalogError, CreatureCatalogPort};
