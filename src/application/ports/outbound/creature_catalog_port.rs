//! Creature catalog port - Interface for loading the creature reference list
//!
//! The catalog is the only source of enemy candidates. Implementations decide
//! where the list comes from (static reference data, the D&D 5e API, an
//! on-disk cache) and own any retry or caching policy.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::CreatureSummary;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Creature catalog unavailable: {0}")]
    Unavailable(String),
    #[error("Creature catalog data is invalid: {0}")]
    InvalidData(String),
}

/// Port for reading the creature catalog
#[async_trait]
pub trait CreatureCatalogPort: Send + Sync {
    /// All known creatures, in catalog order
    async fn list_creatures(&self) -> Result<Arc<Vec<CreatureSummary>>, CatalogError>;

    /// Reload the catalog from its source, bypassing any cache.
    /// Returns the number of creatures loaded.
    async fn refresh(&self) -> Result<usize, CatalogError>;
}
