//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::DeviceNotFound | Self::ConfigNotFound | Self::JobNotFound => {
                StatusCode::NOT_FOUND
            }

            // 409 Conflict
            Self::DuplicateDevice | Self::JobNotCancellable => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::InvalidApiKey | Self::AdminTokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::DeviceDisabled | Self::DeviceMismatch => StatusCode::FORBIDDEN,

            // 426 Upgrade Required
            Self::UpgradeRequired => StatusCode::UPGRADE_REQUIRED,

            // 503 Service Unavailable (device side, caller may resubmit)
            Self::DeviceOffline | Self::AckTimeout | Self::SendFailure => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            // 500 Internal Server Error
            Self::DatabaseError | Self::LogPersistFailure => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request
            Self::ValidationFailed => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(
            ErrorCode::DeviceNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ErrorCode::JobNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_handshake_statuses() {
        assert_eq!(
            ErrorCode::InvalidApiKey.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::UpgradeRequired.http_status(),
            StatusCode::UPGRADE_REQUIRED
        );
    }

    #[test]
    fn test_device_statuses() {
        assert_eq!(
            ErrorCode::DuplicateDevice.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::DeviceMismatch.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::DeviceDisabled.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::DeviceOffline.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_validation_is_bad_request() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_status() {
        assert_eq!(
            ErrorCode::LogPersistFailure.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
