//! Data Transfer Objects - For API boundaries
//!
//! DTOs live in the application layer so infrastructure (HTTP) can
//! serialize/deserialize without leaking transport shapes into the domain model.

pub mod enemy_selection;

pub use enemy_selection::*;
