//! Bridge error taxonomy
//!
//! [`BridgeError`] is what the registry, connection manager, router and
//! recorder return. It converts into [`AppError`] at the HTTP boundary.

use shared::error::{AppError, ErrorCode};
use shared::models::{FailureReason, JobState};
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Invalid or missing API key")]
    InvalidKey,

    #[error("Device already registered: {0}")]
    DuplicateDevice(String),

    #[error("Device is disabled: {0}")]
    DeviceDisabled(String),

    #[error("Device {device_id} does not belong to restaurant {restaurant_id}")]
    DeviceMismatch {
        device_id: String,
        restaurant_id: String,
    },

    #[error("Device is offline: {0}")]
    DeviceOffline(String),

    #[error("Device did not acknowledge in time")]
    AckTimeout,

    #[error("Send failed: {0}")]
    SendFailure(String),

    #[error("Failed to persist print log after {attempts} attempts: {message}")]
    LogPersistFailure { attempts: u32, message: String },

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Print job not found: {0}")]
    JobNotFound(String),

    #[error("Print job {job_id} is {state} and can no longer be cancelled")]
    JobNotCancellable { job_id: String, state: JobState },

    #[error("Printer configuration not found for restaurant {0}")]
    ConfigNotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidKey => ErrorCode::InvalidApiKey,
            Self::DuplicateDevice(_) => ErrorCode::DuplicateDevice,
            Self::DeviceDisabled(_) => ErrorCode::DeviceDisabled,
            Self::DeviceMismatch { .. } => ErrorCode::DeviceMismatch,
            Self::DeviceOffline(_) => ErrorCode::DeviceOffline,
            Self::AckTimeout => ErrorCode::AckTimeout,
            Self::SendFailure(_) => ErrorCode::SendFailure,
            Self::LogPersistFailure { .. } => ErrorCode::LogPersistFailure,
            Self::DeviceNotFound(_) => ErrorCode::DeviceNotFound,
            Self::JobNotFound(_) => ErrorCode::JobNotFound,
            Self::JobNotCancellable { .. } => ErrorCode::JobNotCancellable,
            Self::ConfigNotFound(_) => ErrorCode::ConfigNotFound,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::Storage(_) => ErrorCode::DatabaseError,
        }
    }

    /// Failure reason recorded on a job that terminates with this error
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            Self::DeviceOffline(_) => Some(FailureReason::DeviceOffline),
            Self::AckTimeout => Some(FailureReason::AckTimeout),
            Self::SendFailure(_) => Some(FailureReason::SendFailure),
            Self::DeviceDisabled(_) => Some(FailureReason::DeviceDisabled),
            _ => None,
        }
    }
}

impl From<BridgeError> for AppError {
    fn from(err: BridgeError) -> Self {
        let code = err.code();
        match err {
            // Storage internals stay in the server log
            BridgeError::Storage(e) => {
                tracing::error!(error = %e, "Storage error");
                AppError::new(code)
            }
            BridgeError::DeviceNotFound(id) | BridgeError::DeviceOffline(id) => {
                AppError::new(code).with_detail("device_id", id)
            }
            BridgeError::DeviceDisabled(ref id) | BridgeError::DuplicateDevice(ref id) => {
                let id = id.clone();
                AppError::with_message(code, err.to_string()).with_detail("device_id", id)
            }
            BridgeError::DeviceMismatch {
                ref device_id,
                ref restaurant_id,
            } => {
                let (device_id, restaurant_id) = (device_id.clone(), restaurant_id.clone());
                AppError::new(code)
                    .with_detail("device_id", device_id)
                    .with_detail("restaurant_id", restaurant_id)
            }
            BridgeError::JobNotFound(id) => AppError::new(code).with_detail("job_id", id),
            BridgeError::JobNotCancellable { ref job_id, state } => {
                let job_id = job_id.clone();
                AppError::with_message(code, err.to_string())
                    .with_detail("job_id", job_id)
                    .with_detail("state", state.as_str())
            }
            BridgeError::ConfigNotFound(rid) => {
                AppError::new(code).with_detail("restaurant_id", rid)
            }
            other => AppError::with_message(code, other.to_string()),
        }
    }
}

impl axum::response::IntoResponse for BridgeError {
    fn into_response(self) -> axum::response::Response {
        AppError::from(self).into_response()
    }
}
