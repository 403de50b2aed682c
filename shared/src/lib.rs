//! Shared types for the print bridge
//!
//! Error codes and the error response body, domain models, and the WebSocket
//! protocol spoken between the bridge and printer agents.

pub mod channel;
pub mod error;
pub mod models;
pub mod util;

pub use error::{AppError, AppResult, ErrorCode, ErrorResponse};
