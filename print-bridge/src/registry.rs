//! Device registry
//!
//! Known printer devices, their API keys (hashed) and live status. Records are
//! persisted in [`BridgeStorage`]; status is process-local and written only by
//! the [`ConnectionManager`](crate::connection::ConnectionManager).
//!
//! Status entries are stamped with the session that wrote them. Session ids
//! grow monotonically, so a late update from a replaced or detached session
//! never overwrites the state of its successor.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use shared::models::{Device, DeviceStatus, RegisteredDevice};
use shared::util::now_millis;

use crate::error::{BridgeError, BridgeResult};
use crate::storage::{BridgeStorage, StorageError, StoredDevice};
use crate::utils::validation::{MAX_ID_LEN, MAX_NAME_LEN, validate_required_text};

const API_KEY_PREFIX: &str = "pk_";
const API_KEY_BYTES: usize = 32;

/// Generate a fresh API key from the OS CSPRNG
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; API_KEY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    format!("{API_KEY_PREFIX}{}", hex::encode(bytes))
}

/// SHA-256 hex digest stored in place of the key
pub fn hash_api_key(api_key: &str) -> String {
    hex::encode(Sha256::digest(api_key.as_bytes()))
}

pub struct DeviceRegistry {
    storage: BridgeStorage,
    status: DashMap<String, (u64, DeviceStatus)>,
}

impl DeviceRegistry {
    pub fn new(storage: BridgeStorage) -> Self {
        Self {
            storage,
            status: DashMap::new(),
        }
    }

    /// Register a device under a generated id
    pub fn register(&self, restaurant_id: &str, name: &str) -> BridgeResult<RegisteredDevice> {
        self.register_with_id(restaurant_id, name, None)
    }

    /// Register a device, optionally under an explicit id
    ///
    /// Reusing an explicit id fails with [`BridgeError::DuplicateDevice`].
    pub fn register_with_id(
        &self,
        restaurant_id: &str,
        name: &str,
        device_id: Option<&str>,
    ) -> BridgeResult<RegisteredDevice> {
        validate_required_text(restaurant_id, "restaurant_id", MAX_ID_LEN)?;
        validate_required_text(name, "name", MAX_NAME_LEN)?;
        if let Some(id) = device_id {
            validate_required_text(id, "id", MAX_ID_LEN)?;
        }

        let id = device_id
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let api_key = generate_api_key();

        let record = StoredDevice {
            device: Device {
                id: id.clone(),
                restaurant_id: restaurant_id.to_string(),
                name: name.trim().to_string(),
                disabled: false,
                status: DeviceStatus::Offline,
                created_at: now_millis(),
                last_seen_at: None,
            },
            api_key_hash: hash_api_key(&api_key),
        };

        self.storage.insert_device(&record).map_err(|e| match e {
            StorageError::DuplicateDeviceId(id) => BridgeError::DuplicateDevice(id),
            other => BridgeError::Storage(other),
        })?;

        tracing::info!(
            device_id = %id,
            restaurant_id = %restaurant_id,
            "Device registered"
        );

        Ok(RegisteredDevice {
            device: record.device,
            api_key,
        })
    }

    /// Resolve an API key to its device
    ///
    /// Unknown keys and disabled devices both fail with [`BridgeError::InvalidKey`].
    pub fn authenticate(&self, api_key: &str) -> BridgeResult<Device> {
        if api_key.is_empty() {
            return Err(BridgeError::InvalidKey);
        }
        let record = self
            .storage
            .find_device_by_key_hash(&hash_api_key(api_key))?
            .ok_or(BridgeError::InvalidKey)?;

        if record.device.disabled {
            tracing::warn!(device_id = %record.device.id, "Disabled device presented its key");
            return Err(BridgeError::InvalidKey);
        }
        Ok(self.with_status(record.device))
    }

    /// Mark a device non-dispatchable; history is kept
    pub fn disable(&self, device_id: &str) -> BridgeResult<Device> {
        let mut newly_disabled = false;
        let record = self.update(device_id, |record| {
            newly_disabled = !record.device.disabled;
            record.device.disabled = true;
            newly_disabled
        })?;
        if newly_disabled {
            tracing::info!(device_id = %device_id, "Device disabled");
        }
        Ok(self.with_status(record.device))
    }

    pub fn get(&self, device_id: &str) -> BridgeResult<Device> {
        Ok(self.with_status(self.record(device_id)?.device))
    }

    pub fn list_by_restaurant(&self, restaurant_id: &str) -> BridgeResult<Vec<Device>> {
        Ok(self
            .storage
            .list_devices_by_restaurant(restaurant_id)?
            .into_iter()
            .map(|r| self.with_status(r.device))
            .collect())
    }

    /// Persist the last-seen timestamp
    pub fn touch(&self, device_id: &str, now: i64) -> BridgeResult<()> {
        self.update(device_id, |record| {
            record.device.last_seen_at = Some(now);
            true
        })?;
        Ok(())
    }

    pub fn status(&self, device_id: &str) -> DeviceStatus {
        self.status
            .get(device_id)
            .map(|entry| entry.1)
            .unwrap_or(DeviceStatus::Offline)
    }

    /// Record the status reported by `session_id`
    ///
    /// Updates from an older session are dropped, and once a session has
    /// gone offline it cannot bring the device back.
    pub(crate) fn set_status(&self, device_id: &str, session_id: u64, status: DeviceStatus) {
        match self.status.entry(device_id.to_string()) {
            Entry::Occupied(mut entry) => {
                let (current_session, current_status) = *entry.get();
                let stale = session_id < current_session
                    || (session_id == current_session && current_status == DeviceStatus::Offline);
                if !stale {
                    entry.insert((session_id, status));
                }
            }
            Entry::Vacant(entry) => {
                entry.insert((session_id, status));
            }
        }
    }

    fn record(&self, device_id: &str) -> BridgeResult<StoredDevice> {
        self.storage
            .get_device(device_id)?
            .ok_or_else(|| BridgeError::DeviceNotFound(device_id.to_string()))
    }

    fn update(
        &self,
        device_id: &str,
        apply: impl FnOnce(&mut StoredDevice) -> bool,
    ) -> BridgeResult<StoredDevice> {
        self.storage
            .update_device_with(device_id, apply)
            .map_err(|e| match e {
                StorageError::DeviceNotFound(id) => BridgeError::DeviceNotFound(id),
                other => BridgeError::Storage(other),
            })
    }

    fn with_status(&self, mut device: Device) -> Device {
        device.status = self.status(&device.id);
        device
    }
}
