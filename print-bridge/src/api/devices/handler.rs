//! Device API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, AppResult};
use shared::models::{Device, DeviceCreate, RegisteredDevice};

use crate::core::BridgeState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub restaurant_id: Option<String>,
}

/// POST /api/devices - register a device and issue its API key
///
/// The key is only returned by this call.
pub async fn register(
    State(state): State<BridgeState>,
    Json(payload): Json<DeviceCreate>,
) -> AppResult<Json<RegisteredDevice>> {
    let registered = state.registry.register_with_id(
        &payload.restaurant_id,
        &payload.name,
        payload.id.as_deref(),
    )?;
    Ok(Json(registered))
}

/// GET /api/devices?restaurant_id=
pub async fn list(
    State(state): State<BridgeState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Device>>> {
    let restaurant_id = query
        .restaurant_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::validation("restaurant_id is required"))?;
    Ok(Json(state.registry.list_by_restaurant(&restaurant_id)?))
}

/// GET /api/devices/{id}
pub async fn get_by_id(
    State(state): State<BridgeState>,
    Path(id): Path<String>,
) -> AppResult<Json<Device>> {
    Ok(Json(state.registry.get(&id)?))
}

/// POST /api/devices/{id}/disable
///
/// Queued jobs of the device expire and its channel is closed.
pub async fn disable(
    State(state): State<BridgeState>,
    Path(id): Path<String>,
) -> AppResult<Json<Device>> {
    let device = state.router.disable_device(&id).await?;
    Ok(Json(device))
}
