//! Printer adapters
//!
//! Receipt payloads are already rendered printer bytes; the agent only moves
//! them to the device.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument};

use crate::error::{PrintError, PrintResult};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait Printer: Send + Sync {
    /// Send raw bytes to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;
}

/// Raw TCP printer (port 9100)
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    addr: SocketAddr,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create from a socket address string (e.g. "192.168.1.100:9100")
    pub fn from_addr(addr: &str) -> PrintResult<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|_| PrintError::InvalidConfig(format!("Invalid address: {addr}")))?;
        Ok(Self {
            addr,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Bounds both connect and write
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    async fn send(&self, data: &[u8]) -> PrintResult<()> {
        let mut stream = TcpStream::connect(self.addr)
            .await
            .map_err(|e| PrintError::Connection(format!("{}: {e}", self.addr)))?;
        stream.write_all(data).await?;
        stream.flush().await?;
        stream.shutdown().await?;
        Ok(())
    }
}

#[async_trait]
impl Printer for NetworkPrinter {
    #[instrument(skip(self, data), fields(addr = %self.addr, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        tokio::time::timeout(self.timeout, self.send(data))
            .await
            .map_err(|_| PrintError::Timeout(format!("Printer {} did not respond", self.addr)))??;
        info!("Receipt sent to printer");
        Ok(())
    }
}
