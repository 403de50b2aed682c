//! AgentWorker: keeps the bridge channel open and prints what arrives
//!
//! 1. Connect to the bridge with the device API key
//! 2. Wait for the welcome frame
//! 3. Heartbeat while forwarding each job to the printer and answering ack/nack
//! 4. Reconnect with exponential backoff; stop for good on a rejected key

use std::sync::Arc;
use std::time::Duration;

use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use shared::channel::{API_KEY_HEADER, DeviceFrame, ServerFrame};
use shared::models::Payload;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, StatusCode};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};
use crate::printer::Printer;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const INITIAL_RECONNECT_DELAY: Duration = Duration::from_secs(1);
const WELCOME_TIMEOUT: Duration = Duration::from_secs(10);

pub struct AgentWorker {
    config: AgentConfig,
    printer: Arc<dyn Printer>,
    shutdown: CancellationToken,
}

impl AgentWorker {
    pub fn new(config: AgentConfig, printer: Arc<dyn Printer>, shutdown: CancellationToken) -> Self {
        Self {
            config,
            printer,
            shutdown,
        }
    }

    /// Run until shutdown, or until the bridge rejects the API key
    pub async fn run(self) -> AgentResult<()> {
        tracing::info!(bridge = %self.config.bridge_url, "AgentWorker started");
        let mut reconnect_delay = INITIAL_RECONNECT_DELAY;

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            match self.connect().await {
                Ok(ws) => {
                    reconnect_delay = INITIAL_RECONNECT_DELAY;
                    match self.run_session(ws).await {
                        Ok(()) => tracing::info!("Bridge session ended"),
                        Err(e) => tracing::warn!("Bridge session failed: {e}"),
                    }
                }
                Err(AgentError::Unauthorized) => {
                    tracing::error!("Bridge rejected the API key, giving up");
                    return Err(AgentError::Unauthorized);
                }
                Err(e) => {
                    tracing::warn!(
                        delay_secs = reconnect_delay.as_secs(),
                        "Bridge connection failed: {e}"
                    );
                }
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(reconnect_delay) => {},
            }
            reconnect_delay = (reconnect_delay * 2).min(self.config.max_reconnect_delay());
        }

        tracing::info!("AgentWorker stopped");
        Ok(())
    }

    async fn connect(&self) -> AgentResult<WsStream> {
        let mut request = self.config.channel_url().into_client_request()?;
        let key = HeaderValue::from_str(&self.config.api_key)
            .map_err(|_| AgentError::Config("PRINTER_API_KEY is not a valid header value".into()))?;
        request.headers_mut().insert(API_KEY_HEADER, key);

        match tokio_tungstenite::connect_async(request).await {
            Ok((ws, _)) => Ok(ws),
            Err(tungstenite::Error::Http(resp)) if resp.status() == StatusCode::UNAUTHORIZED => {
                Err(AgentError::Unauthorized)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn run_session(&self, ws: WsStream) -> AgentResult<()> {
        let (mut ws_sink, mut ws_stream) = ws.split();

        let server_heartbeat_secs =
            tokio::time::timeout(WELCOME_TIMEOUT, wait_for_welcome(&mut ws_stream))
                .await
                .map_err(|_| AgentError::Protocol("no welcome from bridge".into()))??;

        let mut heartbeat = tokio::time::interval(self.heartbeat_period(server_heartbeat_secs));
        heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    let _ = ws_sink.close().await;
                    return Ok(());
                }

                // First tick fires immediately
                _ = heartbeat.tick() => {
                    send_frame(&mut ws_sink, &DeviceFrame::Heartbeat).await?;
                }

                msg = ws_stream.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerFrame>(text.as_str()) {
                            Ok(ServerFrame::Job { job_id, payload }) => {
                                let reply = self.print_job(&job_id, &payload).await;
                                send_frame(&mut ws_sink, &reply).await?;
                            }
                            Ok(ServerFrame::Welcome { .. }) => {
                                tracing::debug!("Duplicate welcome ignored");
                            }
                            Err(e) => tracing::warn!("Malformed frame from bridge: {e}"),
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                }
            }
        }
    }

    /// Heartbeat often enough to stay inside the bridge's silence window
    fn heartbeat_period(&self, server_interval_secs: u64) -> Duration {
        let server_bound = Duration::from_secs(server_interval_secs) / 2;
        self.config
            .heartbeat_interval()
            .min(server_bound)
            .max(Duration::from_millis(500))
    }

    async fn print_job(&self, job_id: &str, payload: &Payload) -> DeviceFrame {
        match tokio::time::timeout(self.config.print_timeout(), self.printer.print(payload.as_bytes()))
            .await
        {
            Ok(Ok(())) => {
                tracing::info!(job_id = %job_id, bytes = payload.len(), "Job printed");
                DeviceFrame::ack(job_id)
            }
            Ok(Err(e)) => {
                tracing::warn!(job_id = %job_id, error = %e, "Print failed");
                DeviceFrame::nack(job_id, e.to_string())
            }
            Err(_) => {
                tracing::warn!(job_id = %job_id, "Print timed out");
                DeviceFrame::nack(job_id, "printer timeout")
            }
        }
    }
}

async fn wait_for_welcome(stream: &mut SplitStream<WsStream>) -> AgentResult<u64> {
    while let Some(msg) = stream.next().await {
        let Message::Text(text) = msg? else {
            continue;
        };
        return match serde_json::from_str::<ServerFrame>(text.as_str()) {
            Ok(ServerFrame::Welcome {
                device_id,
                heartbeat_interval_secs,
                config,
            }) => {
                tracing::info!(
                    device_id = %device_id,
                    paper_width = ?config.as_ref().map(|c| c.paper_width),
                    "Connected to bridge"
                );
                Ok(heartbeat_interval_secs)
            }
            Ok(other) => Err(AgentError::Protocol(format!(
                "expected welcome, got {other:?}"
            ))),
            Err(e) => Err(AgentError::Protocol(e.to_string())),
        };
    }
    Err(AgentError::Protocol("channel closed before welcome".into()))
}

async fn send_frame<S>(sink: &mut S, frame: &DeviceFrame) -> AgentResult<()>
where
    S: futures::Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let json = serde_json::to_string(frame).map_err(|e| AgentError::Protocol(e.to_string()))?;
    sink.send(Message::Text(json.into())).await?;
    Ok(())
}
