//! Printer agent endpoints
//!
//! Authenticated with the device API key instead of the admin token.

mod handler;

use axum::{Router, routing::get};

use crate::core::BridgeState;

pub fn router() -> Router<BridgeState> {
    Router::new()
        .route("/api/printer/channel", get(handler::connect))
        .route("/api/printer/status", get(handler::status))
}
