//! Live device channels

mod channel;
mod manager;

pub use channel::DeviceChannel;
pub use manager::{Ack, ConnectionManager, SendError};
