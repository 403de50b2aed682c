//! Device registry API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::BridgeState;

pub fn router() -> Router<BridgeState> {
    Router::new().nest("/api/devices", routes())
}

fn routes() -> Router<BridgeState> {
    Router::new()
        .route("/", post(handler::register).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/disable", post(handler::disable))
}
