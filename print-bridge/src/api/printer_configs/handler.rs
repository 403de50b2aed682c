//! Printer Config API Handlers
//!
//! Agents receive the configuration in the welcome frame, so an update
//! reaches a device on its next connect.

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::AppResult;
use shared::models::{PrinterConfig, PrinterConfigUpdate};
use shared::util::now_millis;

use crate::core::BridgeState;
use crate::error::BridgeError;
use crate::utils::validation::{
    MAX_ID_LEN, MAX_TEMPLATE_LEN, validate_optional_text, validate_paper_width,
    validate_required_text,
};

/// GET /api/restaurants/{id}/printer-config
pub async fn get(
    State(state): State<BridgeState>,
    Path(restaurant_id): Path<String>,
) -> AppResult<Json<PrinterConfig>> {
    let config = state
        .storage
        .get_config(&restaurant_id)
        .map_err(BridgeError::from)?
        .ok_or_else(|| BridgeError::ConfigNotFound(restaurant_id.clone()))?;
    Ok(Json(config))
}

/// PUT /api/restaurants/{id}/printer-config
pub async fn update(
    State(state): State<BridgeState>,
    Path(restaurant_id): Path<String>,
    Json(payload): Json<PrinterConfigUpdate>,
) -> AppResult<Json<PrinterConfig>> {
    validate_required_text(&restaurant_id, "restaurant_id", MAX_ID_LEN)?;
    validate_paper_width(payload.paper_width)?;
    validate_optional_text(&payload.template, "template", MAX_TEMPLATE_LEN)?;

    let config = PrinterConfig {
        restaurant_id,
        paper_width: payload.paper_width,
        template: payload.template,
        updated_at: now_millis(),
    };
    state
        .storage
        .upsert_config(&config)
        .map_err(BridgeError::from)?;

    tracing::info!(
        restaurant_id = %config.restaurant_id,
        paper_width = config.paper_width,
        "Printer config updated"
    );
    Ok(Json(config))
}
