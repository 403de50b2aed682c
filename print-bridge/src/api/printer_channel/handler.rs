//! Device channel handlers
//!
//! The channel is a WebSocket. The key is checked before the upgrade, so a
//! bad key gets a plain 401 and a non-WebSocket request with a good key gets
//! 426. Once upgraded the session task bridges the socket and the
//! [`DeviceChannel`] registered with the connection manager.

use std::collections::HashMap;

use axum::Json;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use shared::channel::{DeviceFrame, ServerFrame};
use shared::error::{AppError, AppResult};
use shared::models::{Device, DeviceStatusView};

use crate::auth::authenticate_device;
use crate::connection::DeviceChannel;
use crate::core::BridgeState;

/// GET /api/printer/channel - upgrade to the device channel
pub async fn connect(
    State(state): State<BridgeState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, AppError> {
    let device = authenticate_device(&state, &headers, &query)?;

    let ws = ws.map_err(|rejection| {
        tracing::debug!(device_id = %device.id, %rejection, "Channel request without upgrade");
        AppError::upgrade_required()
    })?;

    Ok(ws
        .on_upgrade(move |socket| run_session(socket, state, device))
        .into_response())
}

/// GET /api/printer/status - the calling device's own status
pub async fn status(
    State(state): State<BridgeState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> AppResult<Json<DeviceStatusView>> {
    let device = authenticate_device(&state, &headers, &query)?;
    Ok(Json(DeviceStatusView::from(&device)))
}

async fn send_frame(
    sink: &mut SplitSink<WebSocket, Message>,
    frame: &ServerFrame,
) -> Result<(), String> {
    let json = serde_json::to_string(frame).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| e.to_string())
}

async fn run_session(socket: WebSocket, state: BridgeState, device: Device) {
    let (mut ws_sink, mut ws_stream) = socket.split();

    let (channel, mut frame_rx) = DeviceChannel::pair(state.config.channel_capacity);
    let closed = channel.closed_token();
    let session_id = state.connections.attach(&device.id, channel);

    let config = match state.storage.get_config(&device.restaurant_id) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(restaurant_id = %device.restaurant_id, error = %e, "Failed to load printer config");
            None
        }
    };
    let welcome = ServerFrame::Welcome {
        device_id: device.id.clone(),
        heartbeat_interval_secs: state.config.heartbeat_interval_secs,
        config,
    };
    if let Err(e) = send_frame(&mut ws_sink, &welcome).await {
        tracing::warn!(device_id = %device.id, error = %e, "Failed to send welcome, disconnecting");
        state.connections.detach_session(&device.id, session_id);
        return;
    }

    loop {
        tokio::select! {
            _ = closed.cancelled() => {
                tracing::debug!(device_id = %device.id, session_id, "Channel closed by bridge");
                break;
            }
            frame = frame_rx.recv() => {
                let Some(frame) = frame else { break };
                if let Err(e) = send_frame(&mut ws_sink, &frame).await {
                    tracing::warn!(device_id = %device.id, error = %e, "Failed to push frame");
                    break;
                }
            }
            msg = ws_stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<DeviceFrame>(text.as_str()) {
                        Ok(DeviceFrame::Heartbeat) => {
                            state.connections.heartbeat(&device.id, session_id);
                        }
                        Ok(DeviceFrame::Result { job_id, status, detail }) => {
                            state.connections.resolve(&device.id, session_id, &job_id, status, detail);
                        }
                        Err(e) => {
                            tracing::warn!(device_id = %device.id, error = %e, "Malformed device frame ignored");
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                // Ping/Pong handled by the socket; binary frames are not part of the protocol
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(device_id = %device.id, error = %e, "Channel read error");
                    break;
                }
            }
        }
    }

    let _ = ws_sink.send(Message::Close(None)).await;
    state.connections.detach_session(&device.id, session_id);
}
