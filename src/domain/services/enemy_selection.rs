//! Enemy selection - Difficulty resolution, candidate filtering and sampling
//!
//! Given a requested difficulty and an already-fetched creature list, pick up
//! to N distinct creatures whose challenge rating falls inside the
//! difficulty's range. When the exact range has no matches the range is
//! widened once according to the [`WideningPolicy`]; if that also comes up
//! empty the result is an empty, degraded selection rather than an error.
//!
//! Everything here is synchronous and side-effect free. The candidate list is
//! only ever borrowed.
//!
//! [`WideningPolicy`]: crate::domain::value_objects::WideningPolicy

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::entities::CreatureSummary;
use crate::domain::value_objects::{
    ChallengeRating, CrParseError, CrRange, DifficultyBand, DifficultyTier, SelectionPolicy,
};

/// Validation failures for a selection request
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("unknown difficulty '{0}'; expected easy, medium, hard, deadly or a challenge rating")]
    InvalidBand(String),
    #[error("{0}")]
    MalformedCr(#[from] CrParseError),
    /// `requested` keeps the caller's spelling so negative or fractional
    /// counts can be reported too
    #[error("enemy count {requested} is outside 1..={max}")]
    InvalidCount { requested: String, max: usize },
}

/// One request for enemies
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRequest {
    pub band: DifficultyBand,
    pub desired_count: usize,
    pub type_filter: Option<String>,
    pub environment_filter: Option<String>,
    /// Fixed seed for reproducible sampling
    pub seed: Option<u64>,
}

impl SelectionRequest {
    pub fn new(band: DifficultyBand, desired_count: usize) -> Self {
        Self {
            band,
            desired_count,
            type_filter: None,
            environment_filter: None,
            seed: None,
        }
    }

    pub fn with_type_filter(mut self, filter: impl Into<String>) -> Self {
        self.type_filter = Some(filter.into());
        self
    }

    pub fn with_environment_filter(mut self, filter: impl Into<String>) -> Self {
        self.environment_filter = Some(filter.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Outcome of a selection
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub creatures: Vec<CreatureSummary>,
    /// The range actually used (the widened one when `degraded` is set)
    pub effective_range: CrRange,
    /// Distinct creatures matching `effective_range` and the filters
    pub match_count: usize,
    /// The exact range had no matches and the fallback range was used
    pub degraded: bool,
}

/// Stateless enemy selector parameterized by a fixed policy
#[derive(Debug, Clone, Copy, Default)]
pub struct EnemySelector {
    policy: SelectionPolicy,
}

impl EnemySelector {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy }
    }

    /// Interpret a difficulty token as a tier name or an explicit rating.
    ///
    /// Tokens that look numeric but fail to parse report `MalformedCr`;
    /// anything else unrecognized reports `InvalidBand`.
    pub fn parse_band(token: &str) -> Result<DifficultyBand, SelectionError> {
        if let Some(tier) = DifficultyTier::from_name(token) {
            return Ok(DifficultyBand::Tier(tier));
        }

        let trimmed = token.trim();
        let looks_numeric = trimmed.chars().any(|c| c.is_ascii_digit())
            && trimmed
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '/' | '-' | '+' | '.' | ' '));

        if looks_numeric {
            Ok(DifficultyBand::Explicit(ChallengeRating::parse(trimmed)?))
        } else {
            Err(SelectionError::InvalidBand(token.to_string()))
        }
    }

    /// Range for a band: table lookup for tiers, `[cr, cr]` for explicit ratings
    pub fn resolve_range(&self, band: DifficultyBand) -> CrRange {
        match band {
            DifficultyBand::Tier(tier) => self.policy.tiers.range_for(tier),
            DifficultyBand::Explicit(cr) => CrRange::exact(cr),
        }
    }

    /// Stable filter: candidates in `range` that pass the optional filters,
    /// in input order
    pub fn filter_candidates<'a>(
        candidates: &'a [CreatureSummary],
        range: CrRange,
        type_filter: Option<&str>,
        environment_filter: Option<&str>,
    ) -> Vec<&'a CreatureSummary> {
        candidates
            .iter()
            .filter(|c| range.contains(c.reference_rating))
            .filter(|c| type_filter.map_or(true, |f| c.matches_type(f)))
            .filter(|c| environment_filter.map_or(true, |f| c.matches_environment(f)))
            .collect()
    }

    /// Draw `min(count, matches.len())` distinct elements in random order
    pub fn sample<T: Clone, R: Rng + ?Sized>(matches: &[T], count: usize, rng: &mut R) -> Vec<T> {
        let amount = count.min(matches.len());
        rand::seq::index::sample(rng, matches.len(), amount)
            .into_iter()
            .map(|i| matches[i].clone())
            .collect()
    }

    /// Reject counts outside `1..=max_count`
    pub fn check_count(&self, count: usize) -> Result<(), SelectionError> {
        if count == 0 || count > self.policy.max_count {
            return Err(SelectionError::InvalidCount {
                requested: count.to_string(),
                max: self.policy.max_count,
            });
        }
        Ok(())
    }

    /// Full selection: resolve, filter, widen once if needed, then sample
    pub fn select(
        &self,
        request: &SelectionRequest,
        candidates: &[CreatureSummary],
    ) -> Result<SelectionResult, SelectionError> {
        self.check_count(request.desired_count)?;

        let type_filter = non_empty(request.type_filter.as_deref());
        let environment_filter = non_empty(request.environment_filter.as_deref());
        let find = |range: CrRange| {
            distinct_by_id(Self::filter_candidates(
                candidates,
                range,
                type_filter,
                environment_filter,
            ))
        };

        let exact_range = self.resolve_range(request.band);
        let exact_matches = find(exact_range);
        let (effective_range, matches, degraded) = if exact_matches.is_empty() {
            let widened = self.policy.widening.apply(exact_range);
            (widened, find(widened), true)
        } else {
            (exact_range, exact_matches, false)
        };

        let mut rng = match request.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let creatures = Self::sample(&matches, request.desired_count, &mut rng)
            .into_iter()
            .cloned()
            .collect();

        Ok(SelectionResult {
            creatures,
            effective_range,
            match_count: matches.len(),
            degraded,
        })
    }
}

fn non_empty(filter: Option<&str>) -> Option<&str> {
    filter.map(str::trim).filter(|f| !f.is_empty())
}

/// Drop repeated catalog ids, keeping the first occurrence
fn distinct_by_id(matches: Vec<&CreatureSummary>) -> Vec<&CreatureSummary> {
    let mut seen = HashSet::new();
    matches
        .into_iter()
        .filter(|c| seen.insert(c.id.as_str()))
        .collect()
}
