//! Input validation helpers
//!
//! Centralized text length constants and validation functions for the
//! admin API and the registry.

use shared::models::{MAX_PAPER_WIDTH, MIN_PAPER_WIDTH};

use crate::error::BridgeError;

// ── Text length limits ──────────────────────────────────────────────

/// Device names (shown on admin screens and printed on test pages)
pub const MAX_NAME_LEN: usize = 64;

/// Device and restaurant identifiers
pub const MAX_ID_LEN: usize = 128;

/// Receipt templates
pub const MAX_TEMPLATE_LEN: usize = 16 * 1024;

/// Receipt payloads (raw printer bytes, logos included)
pub const MAX_PAYLOAD_LEN: usize = 1024 * 1024;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), BridgeError> {
    if value.trim().is_empty() {
        return Err(BridgeError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(BridgeError::Validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), BridgeError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(BridgeError::Validation(format!(
            "{field} is too long ({} bytes, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a receipt payload: non-empty and within [`MAX_PAYLOAD_LEN`].
pub fn validate_payload(len: usize) -> Result<(), BridgeError> {
    if len == 0 {
        return Err(BridgeError::Validation("payload must not be empty".into()));
    }
    if len > MAX_PAYLOAD_LEN {
        return Err(BridgeError::Validation(format!(
            "payload is too large ({len} bytes, max {MAX_PAYLOAD_LEN})"
        )));
    }
    Ok(())
}

pub fn validate_paper_width(width: u8) -> Result<(), BridgeError> {
    if !(MIN_PAPER_WIDTH..=MAX_PAPER_WIDTH).contains(&width) {
        return Err(BridgeError::Validation(format!(
            "paper_width must be between {MIN_PAPER_WIDTH} and {MAX_PAPER_WIDTH}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text() {
        assert!(validate_required_text("Kitchen", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(65), "name", MAX_NAME_LEN).is_err());
        // Limit counts characters, not bytes
        assert!(validate_required_text(&"é".repeat(64), "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn optional_text() {
        assert!(validate_optional_text(&None, "template", 4).is_ok());
        assert!(validate_optional_text(&Some("abcd".into()), "template", 4).is_ok());
        assert!(validate_optional_text(&Some("abcde".into()), "template", 4).is_err());
    }

    #[test]
    fn payload_bounds() {
        assert!(validate_payload(0).is_err());
        assert!(validate_payload(1).is_ok());
        assert!(validate_payload(MAX_PAYLOAD_LEN + 1).is_err());
    }

    #[test]
    fn paper_width_bounds() {
        assert!(validate_paper_width(48).is_ok());
        assert!(validate_paper_width(31).is_err());
        assert!(validate_paper_width(65).is_err());
    }
}
