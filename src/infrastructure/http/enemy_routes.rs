//! Enemy selection API routes
//!
//! Endpoints for picking encounter enemies by difficulty and for inspecting
//! the difficulty table.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::dto::{
    CatalogRefreshResponseDto, DifficultyTierDto, SelectEnemiesRequestDto, SelectEnemiesResponseDto,
};
use crate::application::services::{EncounterError, EncounterService};
use crate::domain::services::SelectionError;
use crate::infrastructure::state::AppState;

/// Error body returned by enemy routes
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code
    pub error: String,
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, message: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: message.to_string(),
        }),
    )
}

impl From<SelectionError> for ApiError {
    fn from(err: SelectionError) -> Self {
        let code = match &err {
            SelectionError::InvalidBand(_) => "invalid_band",
            SelectionError::MalformedCr(_) => "malformed_cr",
            SelectionError::InvalidCount { .. } => "invalid_count",
        };
        api_error(StatusCode::BAD_REQUEST, code, err)
    }
}

/// Malformed JSON, wrong field types or a missing content type
fn invalid_request(rejection: JsonRejection) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text())
}

fn encounter_error(err: EncounterError) -> ApiError {
    match err {
        EncounterError::Selection(e) => e.into(),
        EncounterError::Catalog(e) => {
            tracing::error!("Creature catalog failure: {}", e);
            api_error(StatusCode::BAD_GATEWAY, "catalog_unavailable", e)
        }
    }
}

/// Select enemies for an encounter
pub async fn select_enemies(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SelectEnemiesRequestDto>, JsonRejection>,
) -> Result<Json<SelectEnemiesResponseDto>, ApiError> {
    let Json(req) = payload.map_err(invalid_request)?;
    let request = req.into_selection_request(state.config.selection_policy.max_count)?;
    let band = request.band;

    let result = state
        .encounter_service
        .select_enemies(request)
        .await
        .map_err(encounter_error)?;

    Ok(Json(SelectEnemiesResponseDto::new(band, result)))
}

/// List the difficulty tiers and their challenge rating ranges
pub async fn list_difficulties(State(state): State<Arc<AppState>>) -> Json<Vec<DifficultyTierDto>> {
    Json(DifficultyTierDto::table(&state.config.selection_policy.tiers))
}

/// Force a reload of the creature catalog
pub async fn refresh_catalog(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogRefreshResponseDto>, ApiError> {
    let creature_count = state
        .encounter_service
        .refresh_catalog()
        .await
        .map_err(encounter_error)?;

    Ok(Json(CatalogRefreshResponseDto { creature_count }))
}
