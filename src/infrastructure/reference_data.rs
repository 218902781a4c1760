//! Static reference data catalog
//!
//! Reads the creature list from a local JSON file (an array of creature
//! summaries). Unlike the D&D 5e API listing, reference data can carry
//! creature types and environment tags.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::application::ports::outbound::{CatalogError, CreatureCatalogPort};
use crate::domain::entities::CreatureSummary;

pub struct ReferenceDataCatalog {
    path: PathBuf,
    creatures: RwLock<Arc<Vec<CreatureSummary>>>,
}

impl ReferenceDataCatalog {
    /// Load the reference file; fails if it is missing or malformed
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        let creatures = read_reference_file(&path).await?;
        info!(path = %path.display(), creatures = creatures.len(), "Loaded creature reference data");
        Ok(Self {
            path,
            creatures: RwLock::new(Arc::new(creatures)),
        })
    }
}

#[async_trait]
impl CreatureCatalogPort for ReferenceDataCatalog {
    async fn list_creatures(&self) -> Result<Arc<Vec<CreatureSummary>>, CatalogError> {
        Ok(self.creatures.read().await.clone())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn refresh(&self) -> Result<usize, CatalogError> {
        let creatures = read_reference_file(&self.path).await?;
        let count = creatures.len();
        *self.creatures.write().await = Arc::new(creatures);
        info!(creatures = count, "Reloaded creature reference data");
        Ok(count)
    }
}

async fn read_reference_file(path: &Path) -> Result<Vec<CreatureSummary>, CatalogError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CatalogError::Unavailable(format!("{}: {}", path.display(), e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| CatalogError::InvalidData(format!("{}: {}", path.display(), e)))
}
