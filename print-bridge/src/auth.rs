//! Request authentication
//!
//! Two principals reach the bridge:
//! - printer agents, identified by their device API key
//! - the order/admin subsystem, holding the admin bearer token

use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use shared::channel::{API_KEY_HEADER, API_KEY_QUERY};
use shared::error::{AppError, ErrorCode};
use sha2::{Digest, Sha256};
use shared::models::Device;
use subtle::ConstantTimeEq;

use crate::core::BridgeState;

/// Bearer token from the `Authorization` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Device API key from `X-Api-Key`, a bearer token or the `api_key` query parameter
pub fn extract_api_key(headers: &HeaderMap, query: &HashMap<String, String>) -> Option<String> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .or_else(|| bearer_token(headers))
        .or_else(|| query.get(API_KEY_QUERY).map(|k| k.trim()))
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

/// Resolve the calling device, or fail with 401
pub fn authenticate_device(
    state: &BridgeState,
    headers: &HeaderMap,
    query: &HashMap<String, String>,
) -> Result<Device, AppError> {
    let api_key = extract_api_key(headers, query)
        .ok_or_else(|| AppError::new(ErrorCode::NotAuthenticated))?;
    Ok(state.registry.authenticate(&api_key)?)
}

/// Admin API guard
///
/// Without a configured token the admin API is open, which `Config::validate`
/// only allows in development.
pub async fn admin_auth_middleware(
    State(state): State<BridgeState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match state.config.admin_token.as_deref() {
        None if state.config.is_development() => {}
        None => return Err(AppError::new(ErrorCode::AdminTokenInvalid)),
        Some(expected) => match bearer_token(request.headers()) {
            Some(token) if tokens_match(token, expected) => {}
            Some(_) => {
                tracing::warn!(path = %request.uri().path(), "Admin request with wrong token");
                return Err(AppError::new(ErrorCode::AdminTokenInvalid));
            }
            None => return Err(AppError::not_authenticated()),
        },
    }
    Ok(next.run(request).await)
}

/// Compare digests in constant time so neither content nor length leaks
fn tokens_match(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    presented.as_slice().ct_eq(expected.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn api_key_sources_in_order() {
        let mut headers = HeaderMap::new();
        let mut query = HashMap::new();
        assert_eq!(extract_api_key(&headers, &query), None);

        query.insert("api_key".to_string(), "from-query".to_string());
        assert_eq!(extract_api_key(&headers, &query).as_deref(), Some("from-query"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-bearer"));
        assert_eq!(extract_api_key(&headers, &query).as_deref(), Some("from-bearer"));

        headers.insert("x-api-key", HeaderValue::from_static("from-header"));
        assert_eq!(extract_api_key(&headers, &query).as_deref(), Some("from-header"));
    }

    #[test]
    fn blank_keys_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("  "));
        let query = HashMap::from([("api_key".to_string(), String::new())]);
        assert_eq!(extract_api_key(&headers, &query), None);
    }

    #[test]
    fn admin_tokens_compare_exactly() {
        assert!(tokens_match("secret-token", "secret-token"));
        assert!(!tokens_match("secret-tokem", "secret-token"));
        assert!(!tokens_match("secret", "secret-token"));
        assert!(!tokens_match("", "secret-token"));
    }
}
