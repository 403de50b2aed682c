//! Error type and the JSON error body

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// This is the error type that crosses the HTTP boundary:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details for debugging
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn upgrade_required() -> Self {
        Self::new(ErrorCode::UpgradeRequired)
    }
}

/// JSON body of every error response
///
/// `code` is the numeric [`ErrorCode`]; `details` carries structured context
/// such as the offending device or job id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ErrorResponse::from(&self);

        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::DeviceOffline);
        assert_eq!(err.code, ErrorCode::DeviceOffline);
        assert_eq!(err.message, "Device is offline");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::validation("name is required")
            .with_detail("field", "name")
            .with_detail("reason", "required");

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details.get("field").unwrap(), "name");
        assert_eq!(details.get("reason").unwrap(), "required");
    }

    #[test]
    fn test_app_error_http_status() {
        assert_eq!(
            AppError::new(ErrorCode::InvalidApiKey).http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::upgrade_required().http_status(),
            StatusCode::UPGRADE_REQUIRED
        );
    }

    #[test]
    fn test_error_response_body() {
        let err = AppError::new(ErrorCode::JobNotFound).with_detail("job_id", "abc");
        let body = ErrorResponse::from(&err);

        assert_eq!(body.code, 4001);
        assert_eq!(body.message, "Print job not found");
        assert_eq!(body.details.as_ref().unwrap()["job_id"], "abc");
    }

    #[test]
    fn test_error_response_serde() {
        let body = ErrorResponse::from(&AppError::new(ErrorCode::DeviceOffline));
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"code":3005,"message":"Device is offline"}"#);

        let parsed: ErrorResponse =
            serde_json::from_str(r#"{"code":3004,"message":"x","details":{"device_id":"d1"}}"#)
                .unwrap();
        assert_eq!(parsed.code, 3004);
        assert_eq!(parsed.details.unwrap()["device_id"], "d1");
    }

    #[test]
    fn test_into_response_status() {
        use axum::response::IntoResponse;

        let response = AppError::new(ErrorCode::DeviceMismatch).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
