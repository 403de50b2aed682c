//! WebSocket protocol between the bridge and printer agents
//!
//! Bridge → Agent: Welcome, Job
//! Agent → Bridge: Heartbeat, Result
//!
//! Frames are JSON text messages tagged by `type`, fields in camelCase.

use serde::{Deserialize, Serialize};

use crate::models::{Payload, PrinterConfig};

/// Query parameter carrying the device API key
pub const API_KEY_QUERY: &str = "api_key";
/// Header carrying the device API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Frames pushed by the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerFrame {
    /// First frame after the channel is accepted
    Welcome {
        device_id: String,
        heartbeat_interval_secs: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        config: Option<PrinterConfig>,
    },
    /// A print job; must be answered with a [`DeviceFrame::Result`]
    Job { job_id: String, payload: Payload },
}

/// Frames sent by a printer agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DeviceFrame {
    Heartbeat,
    Result {
        job_id: String,
        status: AckStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl DeviceFrame {
    pub fn ack(job_id: impl Into<String>) -> Self {
        Self::Result {
            job_id: job_id.into(),
            status: AckStatus::Ack,
            detail: None,
        }
    }

    pub fn nack(job_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Result {
            job_id: job_id.into(),
            status: AckStatus::Nack,
            detail: Some(detail.into()),
        }
    }
}

/// Device verdict on a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    Ack,
    Nack,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_frame_wire_format() {
        let frame = ServerFrame::Job {
            job_id: "j-1".into(),
            payload: Payload::from("hi"),
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "job");
        assert_eq!(json["jobId"], "j-1");
        assert_eq!(json["payload"], "aGk=");
    }

    #[test]
    fn welcome_omits_missing_config() {
        let frame = ServerFrame::Welcome {
            device_id: "d1".into(),
            heartbeat_interval_secs: 30,
            config: None,
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(
            json,
            r#"{"type":"welcome","deviceId":"d1","heartbeatIntervalSecs":30}"#
        );
    }

    #[test]
    fn device_frames_parse() {
        let hb: DeviceFrame = serde_json::from_str(r#"{"type":"heartbeat"}"#).unwrap();
        assert_eq!(hb, DeviceFrame::Heartbeat);

        let nack: DeviceFrame = serde_json::from_str(
            r#"{"type":"result","jobId":"j-2","status":"nack","detail":"paper out"}"#,
        )
        .unwrap();
        assert_eq!(nack, DeviceFrame::nack("j-2", "paper out"));

        let ack: DeviceFrame =
            serde_json::from_str(r#"{"type":"result","jobId":"j-3","status":"ack"}"#).unwrap();
        assert_eq!(ack, DeviceFrame::ack("j-3"));
    }

    #[test]
    fn unknown_frame_type_is_rejected() {
        let result: Result<DeviceFrame, _> = serde_json::from_str(r#"{"type":"print"}"#);
        assert!(result.is_err());
    }
}
