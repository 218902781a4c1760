//! HTTP REST API routes

mod enemy_routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Enemy selection
        .route("/api/enemies/select", post(enemy_routes::select_enemies))
        .route("/api/difficulties", get(enemy_routes::list_difficulties))
        // Catalog maintenance
        .route("/api/catalog/refresh", post(enemy_routes::refresh_catalog))
}
