//! Print job API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::BridgeState;

pub fn router() -> Router<BridgeState> {
    Router::new().nest("/api/print-jobs", routes())
}

fn routes() -> Router<BridgeState> {
    Router::new()
        .route("/", post(handler::submit))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", post(handler::cancel))
}
