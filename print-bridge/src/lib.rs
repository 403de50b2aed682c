//! Print Bridge - restaurant printer dispatch service
//!
//! Receipt printers in each restaurant run a small agent that holds a
//! WebSocket channel open to the bridge. The order system submits print jobs
//! over HTTP; the bridge routes each job to its device, waits for the
//! device's acknowledgment and keeps an audit log of every outcome.
//!
//! ```text
//! print-bridge/src/
//! ├── core/          # config, shared state, server, background tasks
//! ├── api/           # HTTP routes and handlers
//! ├── auth.rs        # admin token and device API key checks
//! ├── registry.rs    # device registry
//! ├── connection/    # live device channels
//! ├── dispatch/      # per-device job lanes
//! ├── recorder.rs    # print log recorder
//! ├── storage.rs     # redb persistence
//! └── utils/         # logging, validation
//! ```

pub mod api;
pub mod auth;
pub mod connection;
pub mod core;
pub mod dispatch;
pub mod error;
pub mod recorder;
pub mod registry;
pub mod storage;
pub mod utils;

pub use connection::{ConnectionManager, DeviceChannel};
pub use core::{BridgeState, Config, Server};
pub use dispatch::DispatchRouter;
pub use error::{BridgeError, BridgeResult};
pub use recorder::LogRecorder;
pub use registry::DeviceRegistry;
pub use storage::BridgeStorage;

pub use utils::logger::{init_logger, init_logger_with_file};

/// Initialize logging from the config
///
/// Returns the log writer guard, which must live as long as the process.
pub fn setup_environment(
    config: &Config,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    init_logger_with_file(config.log_level.as_deref(), config.log_dir.as_deref())
}
