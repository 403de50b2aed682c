//! Printer configuration API (one per restaurant)

mod handler;

use axum::{Router, routing::get};

use crate::core::BridgeState;

pub fn router() -> Router<BridgeState> {
    Router::new().route(
        "/api/restaurants/{id}/printer-config",
        get(handler::get).put(handler::update),
    )
}
