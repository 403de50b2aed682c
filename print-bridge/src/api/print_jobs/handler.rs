//! Print Job API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::AppResult;
use shared::models::{JobStatus, PrintJobCreate};

use crate::core::BridgeState;

/// POST /api/print-jobs
///
/// Returns as soon as the job is queued; poll its status for the outcome.
pub async fn submit(
    State(state): State<BridgeState>,
    Json(payload): Json<PrintJobCreate>,
) -> AppResult<Json<JobStatus>> {
    let job = state
        .router
        .submit(&payload.restaurant_id, &payload.device_id, payload.payload)?;
    Ok(Json(JobStatus::from(&job)))
}

/// GET /api/print-jobs/{id}
pub async fn get_by_id(
    State(state): State<BridgeState>,
    Path(id): Path<String>,
) -> AppResult<Json<JobStatus>> {
    let job = state.router.job(&id)?;
    Ok(Json(JobStatus::from(&job)))
}

/// POST /api/print-jobs/{id}/cancel - queued jobs only
pub async fn cancel(
    State(state): State<BridgeState>,
    Path(id): Path<String>,
) -> AppResult<Json<JobStatus>> {
    let job = state.router.cancel(&id).await?;
    Ok(Json(JobStatus::from(&job)))
}
