//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: creature summaries from the reference catalog
//! - Value Objects: challenge ratings, difficulty bands, selection policy
//! - Domain Services: pure enemy selection logic

pub mod entities;
pub mod services;
pub mod value_objects;
