//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - HTTP: REST API routes
//! - D&D 5e API: remote monster catalog client
//! - Creature cache: on-disk and in-memory catalog caching
//! - Reference data: static JSON creature catalog
//! - Config: Application configuration
//! - State: Shared application state

pub mod config;
pub mod creature_cache;
pub mod dnd5e_api;
pub mod http;
pub mod reference_data;
pub mod state;
