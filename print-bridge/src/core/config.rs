use std::path::PathBuf;
use std::time::Duration;

/// Bridge configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | /var/lib/print-bridge | Data directory (redb file) |
/// | HTTP_PORT | 3000 | HTTP / WebSocket port |
/// | ENVIRONMENT | development | development, staging or production |
/// | ADMIN_TOKEN | (none) | Bearer token for the admin API |
/// | HEARTBEAT_INTERVAL_SECS | 30 | Max silence before a device is detached |
/// | ACK_TIMEOUT_MS | 10000 | Max wait for a job ack |
/// | LOG_PERSIST_RETRIES | 3 | Print log write attempts |
/// | JOB_RETENTION_SECS | 3600 | How long finished jobs stay queryable |
/// | CHANNEL_CAPACITY | 32 | Outbound frame buffer per device |
/// | LOG_DIR | (none) | Daily rolling log files when set |
/// | LOG_LEVEL | (none) | Overrides RUST_LOG |
///
/// ```ignore
/// WORK_DIR=/data/bridge HTTP_PORT=8080 ADMIN_TOKEN=secret print-bridge
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub environment: String,
    /// Admin capability token; `None` leaves the admin API open (development only)
    pub admin_token: Option<String>,
    pub heartbeat_interval_secs: u64,
    pub ack_timeout_ms: u64,
    pub log_persist_retries: u32,
    pub job_retention_secs: u64,
    pub channel_capacity: usize,
    pub log_dir: Option<String>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/print-bridge".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            admin_token: std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),
            heartbeat_interval_secs: std::env::var("HEARTBEAT_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            ack_timeout_ms: std::env::var("ACK_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            log_persist_retries: std::env::var("LOG_PERSIST_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            job_retention_secs: std::env::var("JOB_RETENTION_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            channel_capacity: std::env::var("CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(32),
            log_dir: std::env::var("LOG_DIR").ok(),
            log_level: std::env::var("LOG_LEVEL").ok(),
        }
    }

    /// Override the work dir and port, keeping everything else from the environment
    ///
    /// Used by tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// Reject combinations that must not reach production
    pub fn validate(&self) -> Result<(), String> {
        if self.admin_token.is_none() && !self.is_development() {
            return Err("ADMIN_TOKEN must be set outside development".into());
        }
        if self.heartbeat_interval_secs == 0 {
            return Err("HEARTBEAT_INTERVAL_SECS must be positive".into());
        }
        if self.ack_timeout_ms == 0 {
            return Err("ACK_TIMEOUT_MS must be positive".into());
        }
        if self.channel_capacity == 0 {
            return Err("CHANNEL_CAPACITY must be positive".into());
        }
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("bridge.redb")
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }

    pub fn job_retention(&self) -> Duration {
        Duration::from_secs(self.job_retention_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
