//! Shared application state

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::ports::outbound::CreatureCatalogPort;
use crate::application::services::EncounterServiceImpl;
use crate::domain::services::EnemySelector;
use crate::infrastructure::config::{AppConfig, CatalogSource};
use crate::infrastructure::creature_cache::CachedCreatureCatalog;
use crate::infrastructure::dnd5e_api::Dnd5eApiClient;
use crate::infrastructure::reference_data::ReferenceDataCatalog;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    // Application services
    pub encounter_service: EncounterServiceImpl,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let catalog: Arc<dyn CreatureCatalogPort> = match &config.catalog {
            CatalogSource::ReferenceData { path } => Arc::new(
                ReferenceDataCatalog::load(path.clone())
                    .await
                    .context("Failed to load creature reference data")?,
            ),
            CatalogSource::Dnd5eApi {
                api,
                cache_path,
                cache_ttl,
            } => {
                let client =
                    Dnd5eApiClient::new(api).context("Failed to build D&D 5e API client")?;
                Arc::new(CachedCreatureCatalog::new(
                    Arc::new(client),
                    cache_path.clone(),
                    *cache_ttl,
                ))
            }
        };

        Ok(Self::with_catalog(config, catalog))
    }

    /// Assemble state around an already-built catalog
    pub fn with_catalog(config: AppConfig, catalog: Arc<dyn CreatureCatalogPort>) -> Self {
        let selector = EnemySelector::new(config.selection_policy);
        let encounter_service = EncounterServiceImpl::new(catalog, selector);

        Self {
            config,
            encounter_service,
        }
    }
}
