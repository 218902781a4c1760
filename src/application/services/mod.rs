//! Application services - Use case implementations
//!
//! Each service follows hexagonal architecture principles, accepting port
//! dependencies and returning domain types.

pub mod encounter_service;

pub use encounter_service::{EncounterError, EncounterService, EncounterServiceImpl};
