//! Domain services - Pure business logic operations

mod enemy_selection;

pub use enemy_selection::{EnemySelector, SelectionError, SelectionRequest, SelectionResult};
