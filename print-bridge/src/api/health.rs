//! Health check endpoint

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::core::BridgeState;

pub fn router() -> Router<BridgeState> {
    Router::new().route("/health", get(health_check))
}

pub async fn health_check(State(state): State<BridgeState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "print-bridge",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "connected_devices": state.connections.connected_count(),
    }))
}
