//! Encounter Service - Application service for enemy selection
//!
//! Loads the creature catalog through its port and hands the list to the
//! pure [`EnemySelector`]. The selector never sees the network; the catalog
//! never sees the selection policy.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::application::ports::outbound::{CatalogError, CreatureCatalogPort};
use crate::domain::services::{EnemySelector, SelectionError, SelectionRequest, SelectionResult};

#[derive(Debug, thiserror::Error)]
pub enum EncounterError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Encounter service trait defining the application use cases
#[async_trait]
pub trait EncounterService: Send + Sync {
    /// Select enemies for a validated request
    async fn select_enemies(&self, request: SelectionRequest) -> Result<SelectionResult, EncounterError>;

    /// Reload the creature catalog, returning the number of creatures
    async fn refresh_catalog(&self) -> Result<usize, EncounterError>;
}

/// Default implementation of EncounterService using port abstractions
#[derive(Clone)]
pub struct EncounterServiceImpl {
    catalog: Arc<dyn CreatureCatalogPort>,
    selector: EnemySelector,
}

impl EncounterServiceImpl {
    pub fn new(catalog: Arc<dyn CreatureCatalogPort>, selector: EnemySelector) -> Self {
        Self { catalog, selector }
    }
}

#[async_trait]
impl EncounterService for EncounterServiceImpl {
    #[instrument(skip(self), fields(band = %request.band.display_name(), count = request.desired_count))]
    async fn select_enemies(&self, request: SelectionRequest) -> Result<SelectionResult, EncounterError> {
        // Reject bad counts before touching the catalog
        self.selector.check_count(request.desired_count)?;

        let candidates = self.catalog.list_creatures().await?;
        debug!(candidates = candidates.len(), "Loaded creature catalog");

        let result = self.selector.select(&request, &candidates)?;
        if result.degraded {
            warn!(
                range = %result.effective_range,
                matches = result.match_count,
                "No creatures in requested range; used widened range"
            );
        }
        info!(
            selected = result.creatures.len(),
            matches = result.match_count,
            "Selected enemies"
        );
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn refresh_catalog(&self) -> Result<usize, EncounterError> {
        let count = self.catalog.refresh().await?;
        info!(creatures = count, "Refreshed creature catalog");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::entities::CreatureSummary;
    use crate::domain::value_objects::{ChallengeRating, DifficultyBand, DifficultyTier};

    struct FakeCatalog {
        creatures: Arc<Vec<CreatureSummary>>,
        fetches: AtomicUsize,
    }

    impl FakeCatalog {
        fn new(creatures: Vec<CreatureSummary>) -> Self {
            Self {
                creatures: Arc::new(creatures),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CreatureCatalogPort for FakeCatalog {
        async fn list_creatures(&self) -> Result<Arc<Vec<CreatureSummary>>, CatalogError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.creatures.clone())
        }

        async fn refresh(&self) -> Result<usize, CatalogError> {
            Ok(self.creatures.len())
        }
    }

    struct BrokenCatalog;

    #[async_trait]
    impl CreatureCatalogPort for BrokenCatalog {
        async fn list_creatures(&self) -> Result<Arc<Vec<CreatureSummary>>, CatalogError> {
            Err(CatalogError::Unavailable("connection refused".to_string()))
        }

        async fn refresh(&self) -> Result<usize, CatalogError> {
            Err(CatalogError::Unavailable("connection refused".to_string()))
        }
    }

    fn creature(id: &str, cr: &str) -> CreatureSummary {
        CreatureSummary::new(id, id, ChallengeRating::parse(cr).unwrap())
    }

    #[tokio::test]
    async fn test_select_enemies_uses_catalog() {
        let catalog = Arc::new(FakeCatalog::new(vec![
            creature("goblin", "1/4"),
            creature("troll", "5"),
            creature("ogre", "2"),
        ]));
        let service = EncounterServiceImpl::new(catalog.clone(), EnemySelector::default());

        let request = SelectionRequest::new(DifficultyBand::Tier(DifficultyTier::Easy), 5).with_seed(11);
        let result = service.select_enemies(request).await.unwrap();

        assert_eq!(result.match_count, 2);
        assert_eq!(result.creatures.len(), 2);
        assert!(result.creatures.iter().all(|c| c.id != "troll"));
        assert_eq!(catalog.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_count_skips_catalog() {
        let catalog = Arc::new(FakeCatalog::new(vec![creature("goblin", "1/4")]));
        let service = EncounterServiceImpl::new(catalog.clone(), EnemySelector::default());

        let request = SelectionRequest::new(DifficultyBand::Tier(DifficultyTier::Easy), 9);
        let err = service.select_enemies(request).await.unwrap_err();

        assert!(matches!(
            err,
            EncounterError::Selection(SelectionError::InvalidCount { ref requested, max: 5 }) if requested == "9"
        ));
        assert_eq!(catalog.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_catalog_failure_is_reported() {
        let service = EncounterServiceImpl::new(Arc::new(BrokenCatalog), EnemySelector::default());

        let request = SelectionRequest::new(DifficultyBand::Tier(DifficultyTier::Hard), 1);
        let err = service.select_enemies(request).await.unwrap_err();
        assert!(matches!(err, EncounterError::Catalog(CatalogError::Unavailable(_))));

        assert!(service.refresh_catalog().await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_reports_count() {
        let catalog = Arc::new(FakeCatalog::new(vec![creature("a", "1"), creature("b", "2")]));
        let service = EncounterServiceImpl::new(catalog, EnemySelector::default());
        assert_eq!(service.refresh_catalog().await.unwrap(), 2);
    }
}
