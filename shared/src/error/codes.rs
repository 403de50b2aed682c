//! Unified error codes for the print bridge
//!
//! Error codes are shared by the bridge server, the printer agent and any
//! HTTP caller. They are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 3xxx: Device errors
//! - 4xxx: Print job errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Endpoint only accepts protocol upgrades
    UpgradeRequired = 9,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Device API key is missing, unknown or revoked
    InvalidApiKey = 1002,
    /// Admin capability token is invalid
    AdminTokenInvalid = 1003,

    // ==================== 3xxx: Device ====================
    /// Device not found
    DeviceNotFound = 3001,
    /// Device id already registered
    DuplicateDevice = 3002,
    /// Device has been disabled
    DeviceDisabled = 3003,
    /// Device belongs to another restaurant
    DeviceMismatch = 3004,
    /// Device has no live channel
    DeviceOffline = 3005,
    /// Printer configuration not found
    ConfigNotFound = 3006,

    // ==================== 4xxx: Print job ====================
    /// Print job not found
    JobNotFound = 4001,
    /// Device did not acknowledge in time
    AckTimeout = 4002,
    /// Job could not be delivered or was rejected
    SendFailure = 4003,
    /// Job is no longer queued
    JobNotCancellable = 4004,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
    /// Print log could not be persisted
    LogPersistFailure = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::UpgradeRequired => "WebSocket upgrade required",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::InvalidApiKey => "Invalid or missing API key",
            ErrorCode::AdminTokenInvalid => "Invalid admin token",

            // Device
            ErrorCode::DeviceNotFound => "Device not found",
            ErrorCode::DuplicateDevice => "Device already registered",
            ErrorCode::DeviceDisabled => "Device is disabled",
            ErrorCode::DeviceMismatch => "Device does not belong to this restaurant",
            ErrorCode::DeviceOffline => "Device is offline",
            ErrorCode::ConfigNotFound => "Printer configuration not found",

            // Print job
            ErrorCode::JobNotFound => "Print job not found",
            ErrorCode::AckTimeout => "Device did not acknowledge in time",
            ErrorCode::SendFailure => "Print job could not be delivered",
            ErrorCode::JobNotCancellable => "Only queued jobs can be cancelled",

            // System
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::LogPersistFailure => "Failed to persist print log",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            9 => Ok(ErrorCode::UpgradeRequired),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidApiKey),
            1003 => Ok(ErrorCode::AdminTokenInvalid),

            // Device
            3001 => Ok(ErrorCode::DeviceNotFound),
            3002 => Ok(ErrorCode::DuplicateDevice),
            3003 => Ok(ErrorCode::DeviceDisabled),
            3004 => Ok(ErrorCode::DeviceMismatch),
            3005 => Ok(ErrorCode::DeviceOffline),
            3006 => Ok(ErrorCode::ConfigNotFound),

            // Print job
            4001 => Ok(ErrorCode::JobNotFound),
            4002 => Ok(ErrorCode::AckTimeout),
            4003 => Ok(ErrorCode::SendFailure),
            4004 => Ok(ErrorCode::JobNotCancellable),

            // System
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::LogPersistFailure),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[ErrorCode] = &[
        ErrorCode::ValidationFailed,
        ErrorCode::UpgradeRequired,
        ErrorCode::NotAuthenticated,
        ErrorCode::InvalidApiKey,
        ErrorCode::AdminTokenInvalid,
        ErrorCode::DeviceNotFound,
        ErrorCode::DuplicateDevice,
        ErrorCode::DeviceDisabled,
        ErrorCode::DeviceMismatch,
        ErrorCode::DeviceOffline,
        ErrorCode::ConfigNotFound,
        ErrorCode::JobNotFound,
        ErrorCode::AckTimeout,
        ErrorCode::SendFailure,
        ErrorCode::JobNotCancellable,
        ErrorCode::DatabaseError,
        ErrorCode::LogPersistFailure,
    ];

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::UpgradeRequired.code(), 9);
        assert_eq!(ErrorCode::InvalidApiKey.code(), 1002);
        assert_eq!(ErrorCode::DuplicateDevice.code(), 3002);
        assert_eq!(ErrorCode::DeviceMismatch.code(), 3004);
        assert_eq!(ErrorCode::AckTimeout.code(), 4002);
        assert_eq!(ErrorCode::LogPersistFailure.code(), 9004);
    }

    #[test]
    fn test_try_from_covers_every_variant() {
        for code in ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(*code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(3999), Err(InvalidErrorCode(3999)));
    }

    #[test]
    fn test_serialize() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::DeviceOffline).unwrap(),
            "3005"
        );
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("4003").unwrap();
        assert_eq!(code, ErrorCode::SendFailure);

        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::JobNotFound), "4001");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::DeviceOffline.message(), "Device is offline");
        assert_eq!(
            ErrorCode::LogPersistFailure.message(),
            "Failed to persist print log"
        );
        for code in ALL {
            assert!(!code.message().is_empty());
        }
    }

    #[test]
    fn test_invalid_error_code_display() {
        assert_eq!(
            format!("{}", InvalidErrorCode(42)),
            "invalid error code: 42"
        );
    }
}
