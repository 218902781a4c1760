//! Difficulty bands and challenge rating ranges

use std::fmt;

use serde::{Deserialize, Serialize};

use super::challenge_rating::ChallengeRating;

/// Named threat tiers a GM can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
    Deadly,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Deadly];

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            "deadly" => Some(Self::Deadly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Deadly => "deadly",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Deadly => "Deadly",
        }
    }
}

/// A requested difficulty: a named tier or one exact challenge rating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyBand {
    Tier(DifficultyTier),
    Explicit(ChallengeRating),
}

impl DifficultyBand {
    pub fn display_name(&self) -> String {
        match self {
            Self::Tier(tier) => tier.display_name().to_string(),
            Self::Explicit(cr) => cr.label(),
        }
    }
}

/// Inclusive challenge rating range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrRange {
    pub min: f64,
    pub max: f64,
}

impl CrRange {
    /// Build a range, returning `None` unless `0 <= min <= max`
    pub fn new(min: f64, max: f64) -> Option<Self> {
        if min.is_finite() && max.is_finite() && min >= 0.0 && min <= max {
            Some(Self { min, max })
        } else {
            None
        }
    }

    /// Range covering exactly one rating
    pub fn exact(cr: ChallengeRating) -> Self {
        Self {
            min: cr.value(),
            max: cr.value(),
        }
    }

    pub fn contains(&self, cr: ChallengeRating) -> bool {
        let value = cr.value();
        value >= self.min && value <= self.max
    }

    /// Widen the range, lowering `min` (floored at zero) and raising `max`
    pub fn widened(&self, lower_by: f64, raise_by: f64) -> Self {
        Self {
            min: (self.min - lower_by).max(0.0),
            max: self.max + raise_by,
        }
    }

    /// Display label, e.g. "CR 0-3" or "CR 7"
    pub fn label(&self) -> String {
        if self.min == self.max {
            format!("CR {}", format_bound(self.min))
        } else {
            format!("CR {}-{}", format_bound(self.min), format_bound(self.max))
        }
    }
}

impl fmt::Display for CrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", format_bound(self.min), format_bound(self.max))
    }
}

fn format_bound(value: f64) -> String {
    match ChallengeRating::from_f64(value) {
        Ok(cr) => cr.to_string(),
        Err(_) => value.to_string(),
    }
}
