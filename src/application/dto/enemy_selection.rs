//! Enemy selection DTOs - Request and response shapes for the enemy routes

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::domain::entities::CreatureSummary;
use crate::domain::services::{EnemySelector, SelectionError, SelectionRequest, SelectionResult};
use crate::domain::value_objects::{CrRange, DifficultyBand, DifficultyTier, TierTable};

// ============================================================================
// Request DTOs
// ============================================================================

/// Request to select enemies for an encounter
#[derive(Debug, Clone, Deserialize)]
pub struct SelectEnemiesRequestDto {
    /// Tier name ("easy", "medium", "hard", "deadly") or a rating ("1/4", "7")
    pub difficulty: String,
    /// Any JSON number; anything but a whole number in range is rejected
    /// as an invalid count. Defaults to 1.
    #[serde(default)]
    pub count: Option<Number>,
    #[serde(default)]
    pub type_filter: Option<String>,
    #[serde(default)]
    pub environment_filter: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SelectEnemiesRequestDto {
    /// Parse the difficulty token and count and build the domain request.
    ///
    /// Counts that are not non-negative integers fail here; the range check
    /// against `max_count` happens in the selector.
    pub fn into_selection_request(self, max_count: usize) -> Result<SelectionRequest, SelectionError> {
        let band = EnemySelector::parse_band(&self.difficulty)?;
        let desired_count = match &self.count {
            None => 1,
            Some(count) => count
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| SelectionError::InvalidCount {
                    requested: count.to_string(),
                    max: max_count,
                })?,
        };

        let mut request = SelectionRequest::new(band, desired_count);
        if let Some(filter) = self.type_filter {
            request = request.with_type_filter(filter);
        }
        if let Some(filter) = self.environment_filter {
            request = request.with_environment_filter(filter);
        }
        if let Some(seed) = self.seed {
            request = request.with_seed(seed);
        }
        Ok(request)
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrRangeDto {
    pub min: f64,
    pub max: f64,
}

impl From<CrRange> for CrRangeDto {
    fn from(range: CrRange) -> Self {
        Self {
            min: range.min,
            max: range.max,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyDto {
    pub id: String,
    pub name: String,
    pub challenge_rating: String,
    pub cr_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creature_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environments: Option<Vec<String>>,
}

impl From<CreatureSummary> for EnemyDto {
    fn from(creature: CreatureSummary) -> Self {
        Self {
            id: creature.id,
            name: creature.display_name,
            challenge_rating: creature.reference_rating.to_string(),
            cr_label: creature.reference_rating.label(),
            creature_type: creature.creature_type,
            environments: creature.environments,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectEnemiesResponseDto {
    pub difficulty_label: String,
    pub effective_range: CrRangeDto,
    pub range_label: String,
    pub match_count: usize,
    pub degraded: bool,
    pub enemies: Vec<EnemyDto>,
}

impl SelectEnemiesResponseDto {
    pub fn new(band: DifficultyBand, result: SelectionResult) -> Self {
        Self {
            difficulty_label: band.display_name(),
            effective_range: result.effective_range.into(),
            range_label: result.effective_range.label(),
            match_count: result.match_count,
            degraded: result.degraded,
            enemies: result.creatures.into_iter().map(EnemyDto::from).collect(),
        }
    }
}

/// One row of the difficulty table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyTierDto {
    pub tier: DifficultyTier,
    pub label: String,
    pub min_cr: f64,
    pub max_cr: f64,
    pub range_label: String,
}

impl DifficultyTierDto {
    pub fn table(tiers: &TierTable) -> Vec<Self> {
        DifficultyTier::ALL
            .iter()
            .map(|&tier| {
                let range = tiers.range_for(tier);
                Self {
                    tier,
                    label: tier.display_name().to_string(),
                    min_cr: range.min,
                    max_cr: range.max,
                    range_label: range.label(),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRefreshResponseDto {
    pub creature_count: usize,
}
