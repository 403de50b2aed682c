//! Print log API (read only)

mod handler;

use axum::{Router, routing::get};

use crate::core::BridgeState;

pub fn router() -> Router<BridgeState> {
    Router::new().route("/api/print-logs", get(handler::list))
}
