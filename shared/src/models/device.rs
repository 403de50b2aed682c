//! Printer device model

use serde::{Deserialize, Serialize};

/// Live connection status of a printer device
///
/// Only the bridge's connection manager moves a device between these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    #[default]
    Offline,
    Connected,
    /// A job has been written to the channel and is awaiting its ack
    Busy,
}

/// Registered printer device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    /// Soft-disable flag; disabled devices keep their logs but take no jobs
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub status: DeviceStatus,
    pub created_at: i64,
    pub last_seen_at: Option<i64>,
}

/// Register device payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCreate {
    pub restaurant_id: String,
    pub name: String,
    /// Explicit device id; generated when absent
    #[serde(default)]
    pub id: Option<String>,
}

/// Registration result
///
/// `api_key` is only ever returned here; the bridge keeps a hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredDevice {
    pub device: Device,
    pub api_key: String,
}

/// Device status returned to a polling printer agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatusView {
    pub device_id: String,
    pub restaurant_id: String,
    pub name: String,
    pub status: DeviceStatus,
    pub last_seen_at: Option<i64>,
}

impl From<&Device> for DeviceStatusView {
    fn from(device: &Device) -> Self {
        Self {
            device_id: device.id.clone(),
            restaurant_id: device.restaurant_id.clone(),
            name: device.name.clone(),
            status: device.status,
            last_seen_at: device.last_seen_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DeviceStatus::Busy).unwrap(),
            "\"busy\""
        );
        let status: DeviceStatus = serde_json::from_str("\"connected\"").unwrap();
        assert_eq!(status, DeviceStatus::Connected);
    }

    #[test]
    fn device_defaults_to_offline() {
        let json = r#"{"id":"d1","restaurant_id":"r1","name":"Kitchen","created_at":1,"last_seen_at":null}"#;
        let device: Device = serde_json::from_str(json).unwrap();
        assert_eq!(device.status, DeviceStatus::Offline);
        assert!(!device.disabled);
    }
}
