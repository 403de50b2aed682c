//! Outbound half of a device channel

use shared::channel::ServerFrame;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Handle the connection manager uses to push frames to one device session
///
/// The paired receiver is drained by the session task that owns the socket.
/// Closing the handle cancels its token; the session task then shuts the
/// socket down.
#[derive(Debug, Clone)]
pub struct DeviceChannel {
    tx: mpsc::Sender<ServerFrame>,
    closed: CancellationToken,
}

impl DeviceChannel {
    pub fn pair(capacity: usize) -> (Self, mpsc::Receiver<ServerFrame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                tx,
                closed: CancellationToken::new(),
            },
            rx,
        )
    }

    /// Queue a frame for the session task
    pub async fn push(&self, frame: ServerFrame) -> Result<(), String> {
        if self.is_closed() {
            return Err("channel closed".into());
        }
        self.tx
            .send(frame)
            .await
            .map_err(|_| "session ended".to_string())
    }

    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled() || self.tx.is_closed()
    }

    /// Token cancelled when the manager closes this channel
    pub fn closed_token(&self) -> CancellationToken {
        self.closed.clone()
    }
}
