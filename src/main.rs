//! D&D Copilot Engine - Backend API for encounter building
//!
//! The Engine is the backend server that:
//! - Loads the creature catalog from reference data or the D&D 5e API
//! - Caches remote catalog data on disk
//! - Selects enemies for an encounter by difficulty tier or challenge rating

mod application;
mod domain;
mod infrastructure;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::config::{AppConfig, CatalogSource};
use crate::infrastructure::http;
use crate::infrastructure::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dnd_copilot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting D&D Copilot Engine");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    match &config.catalog {
        CatalogSource::ReferenceData { path } => {
            tracing::info!("  Catalog: reference data at {}", path.display());
        }
        CatalogSource::Dnd5eApi { api, cache_path, .. } => {
            tracing::info!("  Catalog: {} (cache {})", api.base_url, cache_path.display());
        }
    }
    tracing::info!("  Max enemies per request: {}", config.selection_policy.max_count);

    let port = config.server_port;

    // Initialize application state
    let state = AppState::new(config).await?;
    let state = Arc::new(state);
    tracing::info!("Application state initialized");

    // Build the router
    let app = Router::new()
        .route("/health", get(health_check))
        // Merge REST API routes
        .merge(http::create_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Keep serving; the process can still be stopped externally
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn health_check() -> &'static str {
    "OK"
}
