//! Creature entity - A monster or NPC summary from the reference catalog
//!
//! Summaries come from the catalog collaborator (static reference data or
//! the D&D 5e API). Type and environment tags are optional because not every
//! source reports them.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ChallengeRating;

/// Minimal description of a creature that can appear in an encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureSummary {
    /// Catalog identifier, e.g. "goblin"
    pub id: String,
    pub display_name: String,
    pub reference_rating: ChallengeRating,
    /// Creature type or category, e.g. "humanoid (goblinoid)"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creature_type: Option<String>,
    /// Environment tags, e.g. ["forest", "hill"]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environments: Option<Vec<String>>,
}

impl CreatureSummary {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        reference_rating: ChallengeRating,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            reference_rating,
            creature_type: None,
            environments: None,
        }
    }

    pub fn with_type(mut self, creature_type: impl Into<String>) -> Self {
        self.creature_type = Some(creature_type.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environments
            .get_or_insert_with(Vec::new)
            .push(environment.into());
        self
    }

    /// Case-insensitive substring match on the creature type.
    /// A creature without a type (or with a blank one) passes any filter.
    pub fn matches_type(&self, filter: &str) -> bool {
        match self.creature_type.as_deref().map(str::trim) {
            Some(creature_type) if !creature_type.is_empty() => {
                contains_ignore_case(creature_type, filter)
            }
            _ => true,
        }
    }

    /// Case-insensitive substring match against any environment tag.
    /// A creature without environment tags passes any filter.
    pub fn matches_environment(&self, filter: &str) -> bool {
        match self.environments.as_deref() {
            Some(environments) if !environments.is_empty() => environments
                .iter()
                .any(|env| contains_ignore_case(env, filter)),
            _ => true,
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
