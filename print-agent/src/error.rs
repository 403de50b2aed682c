//! Agent error types

use thiserror::Error;

/// Errors talking to the physical printer
#[derive(Debug, Error)]
pub enum PrintError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type PrintResult<T> = Result<T, PrintError>;

/// Errors of the agent's bridge session
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid config: {0}")]
    Config(String),

    /// The bridge rejected the API key; reconnecting will not help
    #[error("API key rejected by bridge")]
    Unauthorized,

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
