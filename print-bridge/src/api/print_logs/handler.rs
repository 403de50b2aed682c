//! Print Log API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use shared::error::AppResult;
use shared::models::{PrintLog, PrintLogQuery};

use crate::core::BridgeState;

/// GET /api/print-logs?restaurant_id=&device_id=&since=&limit=
///
/// Newest first.
pub async fn list(
    State(state): State<BridgeState>,
    Query(query): Query<PrintLogQuery>,
) -> AppResult<Json<Vec<PrintLog>>> {
    Ok(Json(state.recorder.query(&query)?))
}
