//! Print Agent - device side of the print bridge
//!
//! Runs next to a receipt printer, keeps a channel open to the bridge and
//! prints each job it receives, replying ack or nack.

pub mod config;
pub mod error;
pub mod printer;
pub mod worker;

pub use config::AgentConfig;
pub use error::{AgentError, AgentResult, PrintError, PrintResult};
pub use printer::{NetworkPrinter, Printer};
pub use worker::AgentWorker;
