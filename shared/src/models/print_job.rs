//! Print job model and its state machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Print job lifecycle state
///
/// ```text
/// queued ──> sent ──> acknowledged
///   │          └────> failed
///   ├──────────────> failed   (device offline, never sent)
///   └──────────────> expired  (cancelled or device disabled)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Sent,
    Acknowledged,
    Failed,
    Expired,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Acknowledged | Self::Failed | Self::Expired)
    }

    /// Whether `self -> next` is a legal forward transition
    pub fn can_transition_to(&self, next: JobState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Sent)
                | (Self::Queued, Self::Failed)
                | (Self::Queued, Self::Expired)
                | (Self::Sent, Self::Acknowledged)
                | (Self::Sent, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Sent => "sent",
            Self::Acknowledged => "acknowledged",
            Self::Failed => "failed",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a job ended in `failed` or `expired`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    DeviceOffline,
    AckTimeout,
    SendFailure,
    DeviceDisabled,
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DeviceOffline => "device_offline",
            Self::AckTimeout => "ack_timeout",
            Self::SendFailure => "send_failure",
            Self::DeviceDisabled => "device_disabled",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Opaque receipt bytes, carried as standard base64 in JSON
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload(pub Vec<u8>);

impl Payload {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        use base64::{Engine as _, engine::general_purpose::STANDARD};
        STANDARD.encode(&self.0)
    }

    pub fn from_base64(s: &str) -> Result<Self, base64::DecodeError> {
        use base64::{Engine as _, engine::general_purpose::STANDARD};
        STANDARD.decode(s).map(Self)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl Serialize for Payload {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

/// In-flight print job
///
/// Jobs live in the dispatch router's memory only; their outcome is kept as
/// a [`PrintLog`](super::PrintLog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJob {
    pub id: String,
    pub restaurant_id: String,
    pub device_id: String,
    pub payload: Payload,
    pub state: JobState,
    pub submitted_at: i64,
    pub sent_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub failure: Option<FailureReason>,
    pub detail: Option<String>,
}

impl PrintJob {
    pub fn new(
        id: impl Into<String>,
        restaurant_id: impl Into<String>,
        device_id: impl Into<String>,
        payload: Payload,
        submitted_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            restaurant_id: restaurant_id.into(),
            device_id: device_id.into(),
            payload,
            state: JobState::Queued,
            submitted_at,
            sent_at: None,
            finished_at: None,
            failure: None,
            detail: None,
        }
    }
}

/// Job view returned by the status API (payload omitted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub id: String,
    pub restaurant_id: String,
    pub device_id: String,
    pub state: JobState,
    pub payload_len: usize,
    pub submitted_at: i64,
    pub sent_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub failure: Option<FailureReason>,
    pub detail: Option<String>,
}

impl From<&PrintJob> for JobStatus {
    fn from(job: &PrintJob) -> Self {
        Self {
            id: job.id.clone(),
            restaurant_id: job.restaurant_id.clone(),
            device_id: job.device_id.clone(),
            state: job.state,
            payload_len: job.payload.len(),
            submitted_at: job.submitted_at,
            sent_at: job.sent_at,
            finished_at: job.finished_at,
            failure: job.failure,
            detail: job.detail.clone(),
        }
    }
}

/// Submit print job payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintJobCreate {
    pub restaurant_id: String,
    pub device_id: String,
    pub payload: Payload,
}
