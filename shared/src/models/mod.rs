//! Data models
//!
//! Shared between the bridge, the printer agent and HTTP callers.
//! Device and job IDs are strings; log IDs are snowflake `i64`.

pub mod device;
pub mod print_job;
pub mod print_log;
pub mod printer_config;

pub use device::*;
pub use print_job::*;
pub use print_log::*;
pub use printer_config::*;
