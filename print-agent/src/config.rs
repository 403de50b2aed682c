use std::time::Duration;

use crate::error::AgentError;

/// Agent configuration
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | BRIDGE_URL | ws://127.0.0.1:3000 | Bridge base URL (ws:// or wss://) |
/// | PRINTER_API_KEY | (required) | Device API key issued at registration |
/// | PRINTER_ADDR | (required) | Printer socket address, e.g. 192.168.1.100:9100 |
/// | HEARTBEAT_INTERVAL_SECS | 10 | Heartbeat period (capped by the bridge's window) |
/// | PRINT_TIMEOUT_MS | 5000 | Connect and write timeout towards the printer |
/// | MAX_RECONNECT_DELAY_SECS | 60 | Backoff ceiling between reconnects |
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub bridge_url: String,
    pub api_key: String,
    pub printer_addr: String,
    pub heartbeat_interval_secs: u64,
    pub print_timeout_ms: u64,
    pub max_reconnect_delay_secs: u64,
}

impl AgentConfig {
    pub fn from_env() -> Self {
        Self {
            bridge_url: std::env::var("BRIDGE_URL")
                .unwrap_or_else(|_| "ws://127.0.0.1:3000".into()),
            api_key: std::env::var("PRINTER_API_KEY").unwrap_or_default(),
            printer_addr: std::env::var("PRINTER_ADDR").unwrap_or_default(),
            heartbeat_interval_secs: std::env::var("HEARTBEAT_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            print_timeout_ms: std::env::var("PRINT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            max_reconnect_delay_secs: std::env::var("MAX_RECONNECT_DELAY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }

    pub fn validate(&self) -> Result<(), AgentError> {
        if self.api_key.trim().is_empty() {
            return Err(AgentError::Config("PRINTER_API_KEY is required".into()));
        }
        if !(self.bridge_url.starts_with("ws://") || self.bridge_url.starts_with("wss://")) {
            return Err(AgentError::Config(format!(
                "BRIDGE_URL must start with ws:// or wss://, got {}",
                self.bridge_url
            )));
        }
        if self.heartbeat_interval_secs == 0 {
            return Err(AgentError::Config("HEARTBEAT_INTERVAL_SECS must be positive".into()));
        }
        Ok(())
    }

    /// Full URL of the bridge's device channel
    pub fn channel_url(&self) -> String {
        format!("{}/api/printer/channel", self.bridge_url.trim_end_matches('/'))
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn print_timeout(&self) -> Duration {
        Duration::from_millis(self.print_timeout_ms)
    }

    pub fn max_reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.max_reconnect_delay_secs.max(1))
    }
}
