//! HTTP API
//!
//! - [`health`] - liveness probe (public)
//! - [`printer_channel`] - device channel and status (device API key)
//! - [`devices`] - device registry admin
//! - [`printer_configs`] - per-restaurant printer configuration
//! - [`print_jobs`] - job submission, status and cancel
//! - [`print_logs`] - print log queries

pub mod devices;
pub mod health;
pub mod print_jobs;
pub mod print_logs;
pub mod printer_channel;
pub mod printer_configs;

use axum::{Router, middleware};
use http::{HeaderName, HeaderValue};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::admin_auth_middleware;
use crate::core::BridgeState;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Admin routes, all behind the admin token
fn admin_router(state: &BridgeState) -> Router<BridgeState> {
    Router::new()
        .merge(devices::router())
        .merge(printer_configs::router())
        .merge(print_jobs::router())
        .merge(print_logs::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
}

/// Build the complete application with middleware and state
pub fn build_router(state: BridgeState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(printer_channel::router())
        .merge(admin_router(&state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .with_state(state)
}
