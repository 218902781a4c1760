//! Value objects - Immutable objects defined by their attributes

mod challenge_rating;
mod difficulty;
mod selection_policy;

pub use challenge_rating::{ChallengeRating, CrParseError};
pub use difficulty::{CrRange, DifficultyBand, DifficultyTier};
pub use selection_policy::{PolicyError, SelectionPolicy, TierTable, WideningPolicy};
