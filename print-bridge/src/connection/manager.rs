//! Connection manager
//!
//! Tracks exactly one live session per authenticated device. A session owns
//! the outbound [`DeviceChannel`], the last heartbeat time and the
//! acknowledgments it is waiting for.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use shared::channel::{AckStatus, ServerFrame};
use shared::models::{DeviceStatus, Payload};
use shared::util::now_millis;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use super::channel::DeviceChannel;
use crate::error::BridgeError;
use crate::registry::DeviceRegistry;

/// Positive acknowledgment from a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub job_id: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("device is offline")]
    DeviceOffline,

    #[error("no acknowledgment within the ack timeout")]
    AckTimeout,

    #[error("{0}")]
    SendFailure(String),
}

impl SendError {
    pub fn into_bridge_error(self, device_id: &str) -> BridgeError {
        match self {
            Self::DeviceOffline => BridgeError::DeviceOffline(device_id.to_string()),
            Self::AckTimeout => BridgeError::AckTimeout,
            Self::SendFailure(detail) => BridgeError::SendFailure(detail),
        }
    }
}

struct Outcome {
    status: AckStatus,
    detail: Option<String>,
}

struct Session {
    id: u64,
    channel: DeviceChannel,
    last_heartbeat: AtomicI64,
    pending: Mutex<HashMap<String, oneshot::Sender<Outcome>>>,
}

impl Session {
    fn new(id: u64, channel: DeviceChannel, now: i64) -> Self {
        Self {
            id,
            channel,
            last_heartbeat: AtomicI64::new(now),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Close the channel and fail every pending acknowledgment
    fn shutdown(&self) {
        self.channel.close();
        // Dropping the senders wakes waiting `send` calls with an error
        self.pending.lock().clear();
    }
}

pub struct ConnectionManager {
    sessions: DashMap<String, Arc<Session>>,
    registry: Arc<DeviceRegistry>,
    next_session_id: AtomicU64,
    ack_timeout: Duration,
    heartbeat_interval: Duration,
}

impl ConnectionManager {
    pub fn new(
        registry: Arc<DeviceRegistry>,
        ack_timeout: Duration,
        heartbeat_interval: Duration,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            registry,
            next_session_id: AtomicU64::new(0),
            ack_timeout,
            heartbeat_interval,
        }
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    /// Register `channel` as the device's live session
    ///
    /// An existing session is closed first (last writer wins). Returns the new
    /// session id, which the session task passes back on every call.
    pub fn attach(&self, device_id: &str, channel: DeviceChannel) -> u64 {
        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed) + 1;
        let now = now_millis();
        let session = Arc::new(Session::new(session_id, channel, now));

        match self.sessions.entry(device_id.to_string()) {
            Entry::Occupied(mut entry) => {
                let previous = entry.get().id;
                entry.get().shutdown();
                entry.insert(session);
                tracing::info!(
                    device_id = %device_id,
                    previous_session = previous,
                    session_id,
                    "Device reconnected, previous channel closed"
                );
            }
            Entry::Vacant(entry) => {
                entry.insert(session);
                tracing::info!(device_id = %device_id, session_id, "Device channel attached");
            }
        }

        self.registry
            .set_status(device_id, session_id, DeviceStatus::Connected);
        self.touch(device_id, now);
        session_id
    }

    /// Server-initiated detach of whatever session the device has
    pub fn detach(&self, device_id: &str) -> bool {
        match self.sessions.remove(device_id) {
            Some((_, session)) => {
                self.release(device_id, &session);
                tracing::info!(device_id = %device_id, session_id = session.id, "Device channel detached");
                true
            }
            None => false,
        }
    }

    /// Detach only if `session_id` is still the device's live session
    ///
    /// Called by a session task on exit, so that the teardown of a replaced
    /// session never removes its successor.
    pub fn detach_session(&self, device_id: &str, session_id: u64) -> bool {
        match self.sessions.remove_if(device_id, |_, s| s.id == session_id) {
            Some((_, session)) => {
                self.release(device_id, &session);
                tracing::info!(device_id = %device_id, session_id, "Device channel closed");
                true
            }
            // Already replaced or detached
            None => false,
        }
    }

    fn release(&self, device_id: &str, session: &Session) {
        session.shutdown();
        self.registry
            .set_status(device_id, session.id, DeviceStatus::Offline);
        self.touch(device_id, now_millis());
    }

    pub fn is_connected(&self, device_id: &str) -> bool {
        self.sessions.contains_key(device_id)
    }

    pub fn connected_count(&self) -> usize {
        self.sessions.len()
    }

    /// Current session id of a device, if connected
    pub fn session_id(&self, device_id: &str) -> Option<u64> {
        self.sessions.get(device_id).map(|s| s.id)
    }

    /// Forward a job and wait for the device's verdict
    ///
    /// The whole exchange is bounded by the ack timeout. The device is `busy`
    /// while the exchange is in progress.
    pub async fn send(
        &self,
        device_id: &str,
        job_id: &str,
        payload: Payload,
    ) -> Result<Ack, SendError> {
        let session = self
            .sessions
            .get(device_id)
            .map(|s| Arc::clone(s.value()))
            .ok_or(SendError::DeviceOffline)?;

        let (tx, rx) = oneshot::channel();
        session.pending.lock().insert(job_id.to_string(), tx);
        if session.channel.is_closed() {
            session.pending.lock().remove(job_id);
            return Err(SendError::SendFailure("channel closed".into()));
        }

        self.registry
            .set_status(device_id, session.id, DeviceStatus::Busy);

        let frame = ServerFrame::Job {
            job_id: job_id.to_string(),
            payload,
        };
        let exchange = async {
            session
                .channel
                .push(frame)
                .await
                .map_err(SendError::SendFailure)?;
            match rx.await {
                Ok(Outcome {
                    status: AckStatus::Ack,
                    detail,
                }) => Ok(Ack {
                    job_id: job_id.to_string(),
                    detail,
                }),
                Ok(Outcome {
                    status: AckStatus::Nack,
                    detail,
                }) => Err(SendError::SendFailure(
                    detail.unwrap_or_else(|| "rejected by device".into()),
                )),
                Err(_) => Err(SendError::SendFailure(
                    "channel closed before acknowledgment".into(),
                )),
            }
        };

        let result = tokio::time::timeout(self.ack_timeout, exchange)
            .await
            .unwrap_or(Err(SendError::AckTimeout));

        session.pending.lock().remove(job_id);
        self.registry
            .set_status(device_id, session.id, DeviceStatus::Connected);

        if let Err(e) = &result {
            tracing::warn!(device_id = %device_id, job_id = %job_id, error = %e, "Print job not acknowledged");
        }
        result
    }

    /// Deliver a device's ack/nack to the waiting `send`
    ///
    /// Returns `false` for results nobody is waiting for (late, duplicate or
    /// from a stale session).
    pub fn resolve(
        &self,
        device_id: &str,
        session_id: u64,
        job_id: &str,
        status: AckStatus,
        detail: Option<String>,
    ) -> bool {
        let Some(session) = self.current(device_id, session_id) else {
            return false;
        };
        let Some(tx) = session.pending.lock().remove(job_id) else {
            tracing::debug!(device_id = %device_id, job_id = %job_id, "Result for unknown job ignored");
            return false;
        };
        tx.send(Outcome { status, detail }).is_ok()
    }

    /// Record a liveness signal; `false` if the session is no longer live
    pub fn heartbeat(&self, device_id: &str, session_id: u64) -> bool {
        let Some(session) = self.current(device_id, session_id) else {
            return false;
        };
        let now = now_millis();
        session.last_heartbeat.store(now, Ordering::Relaxed);
        self.touch(device_id, now);
        true
    }

    /// Detach every session silent for longer than the heartbeat interval
    pub fn reap_stale(&self, now: i64) -> Vec<String> {
        let max_silence = self.heartbeat_interval.as_millis() as i64;
        let stale: Vec<(String, u64)> = self
            .sessions
            .iter()
            .filter(|entry| now - entry.last_heartbeat.load(Ordering::Relaxed) > max_silence)
            .map(|entry| (entry.key().clone(), entry.id))
            .collect();

        let mut reaped = Vec::with_capacity(stale.len());
        for (device_id, session_id) in stale {
            if self.detach_session(&device_id, session_id) {
                tracing::warn!(device_id = %device_id, session_id, "Heartbeat timeout, device detached");
                reaped.push(device_id);
            }
        }
        reaped
    }

    /// Periodically reap stale sessions until `shutdown` fires
    pub async fn run_reaper(self: Arc<Self>, shutdown: CancellationToken) {
        let period = (self.heartbeat_interval / 3).max(Duration::from_millis(50));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    self.reap_stale(now_millis());
                }
            }
        }
    }

    /// Close every session (process shutdown)
    pub fn close_all(&self) {
        let devices: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        for device_id in devices {
            self.detach(&device_id);
        }
    }

    fn current(&self, device_id: &str, session_id: u64) -> Option<Arc<Session>> {
        self.sessions
            .get(device_id)
            .filter(|s| s.id == session_id)
            .map(|s| Arc::clone(s.value()))
    }

    fn touch(&self, device_id: &str, now: i64) {
        if let Err(e) = self.registry.touch(device_id, now) {
            tracing::warn!(device_id = %device_id, error = %e, "Failed to persist last seen time");
        }
    }
}
