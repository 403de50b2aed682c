//! Bridge core: configuration, shared state, server lifecycle

pub mod config;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use server::{Server, serve};
pub use state::BridgeState;
pub use tasks::{BackgroundTasks, TaskKind};
