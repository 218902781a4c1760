//! Enemy selection policy
//!
//! The tier boundaries and fallback widening amounts are product decisions
//! rather than derived values. They are built once at startup (defaults below,
//! optionally overridden from configuration) and never change afterwards.

use super::difficulty::{CrRange, DifficultyTier};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("invalid range for tier '{tier}': min {min} must be >= 0 and <= max {max}")]
    InvalidTierRange { tier: &'static str, min: f64, max: f64 },
    #[error("widening amounts must be non-negative (lower_by {lower_by}, raise_by {raise_by})")]
    InvalidWidening { lower_by: f64, raise_by: f64 },
    #[error("maximum enemy count must be at least 1")]
    InvalidMaxCount,
}

/// Fixed tier -> range mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierTable {
    easy: CrRange,
    medium: CrRange,
    hard: CrRange,
    deadly: CrRange,
}

impl TierTable {
    /// Build a table from `(min, max)` pairs, validating each range
    pub fn new(
        easy: (f64, f64),
        medium: (f64, f64),
        hard: (f64, f64),
        deadly: (f64, f64),
    ) -> Result<Self, PolicyError> {
        Ok(Self {
            easy: checked_range(DifficultyTier::Easy, easy)?,
            medium: checked_range(DifficultyTier::Medium, medium)?,
            hard: checked_range(DifficultyTier::Hard, hard)?,
            deadly: checked_range(DifficultyTier::Deadly, deadly)?,
        })
    }

    pub fn range_for(&self, tier: DifficultyTier) -> CrRange {
        match tier {
            DifficultyTier::Easy => self.easy,
            DifficultyTier::Medium => self.medium,
            DifficultyTier::Hard => self.hard,
            DifficultyTier::Deadly => self.deadly,
        }
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            easy: CrRange { min: 0.0, max: 3.0 },
            medium: CrRange { min: 1.0, max: 4.0 },
            hard: CrRange { min: 2.0, max: 6.0 },
            deadly: CrRange { min: 5.0, max: 12.0 },
        }
    }
}

fn checked_range(tier: DifficultyTier, (min, max): (f64, f64)) -> Result<CrRange, PolicyError> {
    CrRange::new(min, max).ok_or(PolicyError::InvalidTierRange {
        tier: tier.as_str(),
        min,
        max,
    })
}

/// How far an empty range is widened before giving up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WideningPolicy {
    lower_by: f64,
    raise_by: f64,
}

impl WideningPolicy {
    pub fn new(lower_by: f64, raise_by: f64) -> Result<Self, PolicyError> {
        if !(lower_by.is_finite() && raise_by.is_finite() && lower_by >= 0.0 && raise_by >= 0.0) {
            return Err(PolicyError::InvalidWidening { lower_by, raise_by });
        }
        Ok(Self { lower_by, raise_by })
    }

    pub fn apply(&self, range: CrRange) -> CrRange {
        range.widened(self.lower_by, self.raise_by)
    }
}

impl Default for WideningPolicy {
    fn default() -> Self {
        Self {
            lower_by: 1.0,
            raise_by: 2.0,
        }
    }
}

/// Everything the enemy selector needs to know about policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPolicy {
    pub tiers: TierTable,
    pub widening: WideningPolicy,
    pub max_count: usize,
}

impl SelectionPolicy {
    pub fn new(
        tiers: TierTable,
        widening: WideningPolicy,
        max_count: usize,
    ) -> Result<Self, PolicyError> {
        if max_count == 0 {
            return Err(PolicyError::InvalidMaxCount);
        }
        Ok(Self {
            tiers,
            widening,
            max_count,
        })
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            tiers: TierTable::default(),
            widening: WideningPolicy::default(),
            max_count: 5,
        }
    }
}
