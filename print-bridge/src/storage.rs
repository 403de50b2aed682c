//! redb-based storage for devices, printer configs and print logs
//!
//! Values are JSON; secondary indexes are tuple-keyed tables with unit values
//! and are maintained in the same write transaction as the record.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::{Deserialize, Serialize};
use shared::models::{Device, PrintLog, PrinterConfig};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Devices: key = device_id, value = JSON [`StoredDevice`]
const DEVICES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("devices");

/// Unique index: api_key_hash -> device_id
const DEVICES_BY_KEY_TABLE: TableDefinition<&str, &str> = TableDefinition::new("devices_by_key");

/// Index: (restaurant_id, device_id) -> ()
const DEVICES_BY_RESTAURANT_TABLE: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("devices_by_restaurant");

/// Printer configs: key = restaurant_id (unique), value = JSON
const PRINTER_CONFIGS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("printer_configs");

/// Print logs: key = log id, value = JSON
const PRINT_LOGS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("print_logs");

/// Unique index: job_id -> log id (one log per job)
const PRINT_LOGS_BY_JOB_TABLE: TableDefinition<&str, i64> = TableDefinition::new("print_logs_by_job");

/// Index: (timestamp, log id) -> ()
const PRINT_LOGS_BY_TIME_TABLE: TableDefinition<(i64, i64), ()> =
    TableDefinition::new("print_logs_by_time");

/// Index: (restaurant_id, timestamp, log id) -> ()
const PRINT_LOGS_BY_RESTAURANT_TABLE: TableDefinition<(&str, i64, i64), ()> =
    TableDefinition::new("print_logs_by_restaurant");

/// Index: (device_id, timestamp, log id) -> ()
const PRINT_LOGS_BY_DEVICE_TABLE: TableDefinition<(&str, i64, i64), ()> =
    TableDefinition::new("print_logs_by_device");

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Device id already exists: {0}")]
    DuplicateDeviceId(String),

    #[error("API key already in use")]
    DuplicateApiKey,

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Print log already recorded for job {0}")]
    DuplicateLog(String),

    #[error("Print log id collision: {0}")]
    DuplicateLogId(i64),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persisted device record
///
/// The API key itself is never stored, only its SHA-256 hex digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDevice {
    #[serde(flatten)]
    pub device: Device,
    pub api_key_hash: String,
}

/// Append-only destination for print logs
///
/// [`BridgeStorage`] is the production sink; tests substitute failing ones.
pub trait LogSink: Send + Sync {
    fn append_log(&self, log: &PrintLog) -> StorageResult<()>;
}

/// Bridge storage
#[derive(Clone)]
pub struct BridgeStorage {
    db: Arc<Database>,
}

impl BridgeStorage {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db =
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DEVICES_TABLE)?;
            let _ = write_txn.open_table(DEVICES_BY_KEY_TABLE)?;
            let _ = write_txn.open_table(DEVICES_BY_RESTAURANT_TABLE)?;
            let _ = write_txn.open_table(PRINTER_CONFIGS_TABLE)?;
            let _ = write_txn.open_table(PRINT_LOGS_TABLE)?;
            let _ = write_txn.open_table(PRINT_LOGS_BY_JOB_TABLE)?;
            let _ = write_txn.open_table(PRINT_LOGS_BY_TIME_TABLE)?;
            let _ = write_txn.open_table(PRINT_LOGS_BY_RESTAURANT_TABLE)?;
            let _ = write_txn.open_table(PRINT_LOGS_BY_DEVICE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    // ========== Devices ==========

    /// Insert a new device, enforcing unique id and unique API key
    pub fn insert_device(&self, record: &StoredDevice) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut devices = txn.open_table(DEVICES_TABLE)?;
            let mut by_key = txn.open_table(DEVICES_BY_KEY_TABLE)?;
            let mut by_restaurant = txn.open_table(DEVICES_BY_RESTAURANT_TABLE)?;

            let id = record.device.id.as_str();
            if devices.get(id)?.is_some() {
                return Err(StorageError::DuplicateDeviceId(id.to_string()));
            }
            if by_key.get(record.api_key_hash.as_str())?.is_some() {
                return Err(StorageError::DuplicateApiKey);
            }

            let value = serde_json::to_vec(record)?;
            devices.insert(id, value.as_slice())?;
            by_key.insert(record.api_key_hash.as_str(), id)?;
            by_restaurant.insert((record.device.restaurant_id.as_str(), id), ())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Read-modify-write a device inside one write transaction
    ///
    /// `apply` returns whether it changed the record; unchanged records are not
    /// rewritten. Restaurant and API key are fixed at registration, so indexes
    /// are untouched. Concurrent updates of different fields cannot undo each
    /// other.
    pub fn update_device_with<F>(&self, id: &str, apply: F) -> StorageResult<StoredDevice>
    where
        F: FnOnce(&mut StoredDevice) -> bool,
    {
        let txn = self.db.begin_write()?;
        let record = {
            let mut devices = txn.open_table(DEVICES_TABLE)?;
            let mut record: StoredDevice = match devices.get(id)? {
                Some(guard) => serde_json::from_slice(guard.value())?,
                None => return Err(StorageError::DeviceNotFound(id.to_string())),
            };
            if !apply(&mut record) {
                return Ok(record);
            }
            let value = serde_json::to_vec(&record)?;
            devices.insert(id, value.as_slice())?;
            record
        };
        txn.commit()?;
        Ok(record)
    }

    pub fn get_device(&self, id: &str) -> StorageResult<Option<StoredDevice>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DEVICES_TABLE)?;

        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn find_device_by_key_hash(&self, key_hash: &str) -> StorageResult<Option<StoredDevice>> {
        let read_txn = self.db.begin_read()?;
        let by_key = read_txn.open_table(DEVICES_BY_KEY_TABLE)?;
        let devices = read_txn.open_table(DEVICES_TABLE)?;

        let Some(id_guard) = by_key.get(key_hash)? else {
            return Ok(None);
        };
        match devices.get(id_guard.value())? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Devices of a restaurant, oldest first
    pub fn list_devices_by_restaurant(&self, restaurant_id: &str) -> StorageResult<Vec<StoredDevice>> {
        let read_txn = self.db.begin_read()?;
        let idx_table = read_txn.open_table(DEVICES_BY_RESTAURANT_TABLE)?;
        let data_table = read_txn.open_table(DEVICES_TABLE)?;

        let mut devices = Vec::new();
        let range_start: (&str, &str) = (restaurant_id, "");
        let range_end: (&str, &str) = (restaurant_id, "\u{ffff}");

        for result in idx_table.range(range_start..=range_end)? {
            let (key, _) = result?;
            let (_, device_id) = key.value();
            if let Some(guard) = data_table.get(device_id)? {
                let record: StoredDevice = serde_json::from_slice(guard.value())?;
                devices.push(record);
            }
        }

        devices.sort_by_key(|d| d.device.created_at);
        Ok(devices)
    }

    // ========== Printer configs ==========

    /// Insert or replace the single config of a restaurant
    pub fn upsert_config(&self, config: &PrinterConfig) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PRINTER_CONFIGS_TABLE)?;
            let value = serde_json::to_vec(config)?;
            table.insert(config.restaurant_id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_config(&self, restaurant_id: &str) -> StorageResult<Option<PrinterConfig>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRINTER_CONFIGS_TABLE)?;

        match table.get(restaurant_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    // ========== Print logs ==========

    fn store_log(&self, txn: &WriteTransaction, log: &PrintLog) -> StorageResult<()> {
        let mut by_job = txn.open_table(PRINT_LOGS_BY_JOB_TABLE)?;
        if by_job.get(log.job_id.as_str())?.is_some() {
            return Err(StorageError::DuplicateLog(log.job_id.clone()));
        }

        let mut logs = txn.open_table(PRINT_LOGS_TABLE)?;
        if logs.get(log.id)?.is_some() {
            return Err(StorageError::DuplicateLogId(log.id));
        }
        let value = serde_json::to_vec(log)?;
        logs.insert(log.id, value.as_slice())?;
        by_job.insert(log.job_id.as_str(), log.id)?;

        let mut by_time = txn.open_table(PRINT_LOGS_BY_TIME_TABLE)?;
        by_time.insert((log.timestamp, log.id), ())?;

        let mut by_restaurant = txn.open_table(PRINT_LOGS_BY_RESTAURANT_TABLE)?;
        by_restaurant.insert((log.restaurant_id.as_str(), log.timestamp, log.id), ())?;

        let mut by_device = txn.open_table(PRINT_LOGS_BY_DEVICE_TABLE)?;
        by_device.insert((log.device_id.as_str(), log.timestamp, log.id), ())?;

        Ok(())
    }

    pub fn get_log_for_job(&self, job_id: &str) -> StorageResult<Option<PrintLog>> {
        let read_txn = self.db.begin_read()?;
        let by_job = read_txn.open_table(PRINT_LOGS_BY_JOB_TABLE)?;
        let logs = read_txn.open_table(PRINT_LOGS_TABLE)?;

        let Some(id_guard) = by_job.get(job_id)? else {
            return Ok(None);
        };
        match logs.get(id_guard.value())? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Most recent logs across all restaurants, newest first
    pub fn list_recent_logs(&self, since: Option<i64>, limit: usize) -> StorageResult<Vec<PrintLog>> {
        let read_txn = self.db.begin_read()?;
        let idx_table = read_txn.open_table(PRINT_LOGS_BY_TIME_TABLE)?;
        let data_table = read_txn.open_table(PRINT_LOGS_TABLE)?;

        let range_start: (i64, i64) = (since.unwrap_or(i64::MIN), i64::MIN);
        let range_end: (i64, i64) = (i64::MAX, i64::MAX);

        let mut logs = Vec::new();
        for result in idx_table.range(range_start..=range_end)?.rev().take(limit) {
            let (key, _) = result?;
            let (_, log_id) = key.value();
            if let Some(guard) = data_table.get(log_id)? {
                logs.push(serde_json::from_slice(guard.value())?);
            }
        }
        Ok(logs)
    }

    /// Logs of a restaurant, newest first
    pub fn list_logs_by_restaurant(
        &self,
        restaurant_id: &str,
        since: Option<i64>,
        limit: usize,
    ) -> StorageResult<Vec<PrintLog>> {
        self.list_logs_by_owner(
            PRINT_LOGS_BY_RESTAURANT_TABLE,
            restaurant_id,
            since,
            limit,
            |_| true,
        )
    }

    /// Logs of a device, newest first
    ///
    /// With `restaurant_id`, only that restaurant's logs count towards `limit`.
    pub fn list_logs_by_device(
        &self,
        device_id: &str,
        restaurant_id: Option<&str>,
        since: Option<i64>,
        limit: usize,
    ) -> StorageResult<Vec<PrintLog>> {
        self.list_logs_by_owner(PRINT_LOGS_BY_DEVICE_TABLE, device_id, since, limit, |log| {
            restaurant_id.is_none_or(|r| log.restaurant_id == r)
        })
    }

    fn list_logs_by_owner(
        &self,
        index: TableDefinition<'static, (&'static str, i64, i64), ()>,
        owner: &str,
        since: Option<i64>,
        limit: usize,
        keep: impl Fn(&PrintLog) -> bool,
    ) -> StorageResult<Vec<PrintLog>> {
        let read_txn = self.db.begin_read()?;
        let idx_table = read_txn.open_table(index)?;
        let data_table = read_txn.open_table(PRINT_LOGS_TABLE)?;

        let range_start: (&str, i64, i64) = (owner, since.unwrap_or(i64::MIN), i64::MIN);
        let range_end: (&str, i64, i64) = (owner, i64::MAX, i64::MAX);

        let mut logs = Vec::new();
        for result in idx_table.range(range_start..=range_end)?.rev() {
            if logs.len() >= limit {
                break;
            }
            let (key, _) = result?;
            let (_, _, log_id) = key.value();
            if let Some(guard) = data_table.get(log_id)? {
                let log: PrintLog = serde_json::from_slice(guard.value())?;
                if keep(&log) {
                    logs.push(log);
                }
            }
        }
        Ok(logs)
    }
}

impl LogSink for BridgeStorage {
    fn append_log(&self, log: &PrintLog) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        self.store_log(&txn, log)?;
        txn.commit()?;
        Ok(())
    }
}
