//! Print log recorder
//!
//! Writes one immutable [`PrintLog`] per job when the job reaches a terminal
//! state. Persistence failures are retried with a short backoff, then
//! reported as a warning. The job's outcome is never affected.

use std::sync::Arc;
use std::time::Duration;

use shared::models::{PrintJob, PrintLog, PrintLogQuery};
use shared::util::snowflake_id;

use crate::error::{BridgeError, BridgeResult};
use crate::storage::{BridgeStorage, LogSink, StorageError};

const DEFAULT_QUERY_LIMIT: usize = 100;
const MAX_QUERY_LIMIT: usize = 1000;
const BASE_RETRY_DELAY: Duration = Duration::from_millis(20);

pub struct LogRecorder {
    sink: Arc<dyn LogSink>,
    storage: BridgeStorage,
    attempts: u32,
    retry_delay: Duration,
}

impl LogRecorder {
    /// `attempts` is the total number of writes tried per log (at least one)
    pub fn new(storage: BridgeStorage, attempts: u32) -> Self {
        Self::with_sink(Arc::new(storage.clone()), storage, attempts)
    }

    /// Recorder writing to a custom sink while reading from `storage`
    pub fn with_sink(sink: Arc<dyn LogSink>, storage: BridgeStorage, attempts: u32) -> Self {
        Self {
            sink,
            storage,
            attempts: attempts.max(1),
            retry_delay: BASE_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Append the log for a terminal job
    pub async fn record(&self, job: &PrintJob) -> BridgeResult<PrintLog> {
        debug_assert!(job.state.is_terminal(), "only terminal jobs are logged");

        let mut log = PrintLog::from_job(snowflake_id(), job);
        let mut last_error = String::new();

        for attempt in 1..=self.attempts {
            if attempt > 1 {
                log.id = snowflake_id();
            }
            match self.sink.append_log(&log) {
                Ok(()) => {
                    tracing::debug!(
                        job_id = %log.job_id,
                        device_id = %log.device_id,
                        state = %log.state,
                        "Print log recorded"
                    );
                    return Ok(log);
                }
                Err(StorageError::DuplicateLog(job_id)) => {
                    // Already recorded; a retry would never succeed
                    tracing::warn!(job_id = %job_id, "Print log already exists, skipping");
                    return Err(BridgeError::LogPersistFailure {
                        attempts: attempt,
                        message: format!("log already recorded for job {job_id}"),
                    });
                }
                Err(e) => {
                    tracing::debug!(job_id = %log.job_id, attempt, error = %e, "Print log write failed");
                    last_error = e.to_string();
                    if attempt < self.attempts {
                        tokio::time::sleep(self.retry_delay * attempt).await;
                    }
                }
            }
        }

        tracing::warn!(
            job_id = %log.job_id,
            device_id = %log.device_id,
            state = %log.state,
            attempts = self.attempts,
            error = %last_error,
            "Failed to persist print log, outcome kept in memory only"
        );
        Err(BridgeError::LogPersistFailure {
            attempts: self.attempts,
            message: last_error,
        })
    }

    /// Query logs, newest first
    ///
    /// Device filter wins over restaurant filter; with neither, all logs are
    /// considered.
    pub fn query(&self, query: &PrintLogQuery) -> BridgeResult<Vec<PrintLog>> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_QUERY_LIMIT)
            .clamp(1, MAX_QUERY_LIMIT);

        match (&query.device_id, &query.restaurant_id) {
            (Some(device_id), Some(restaurant_id)) => Ok(self.storage.list_logs_by_device(
                device_id,
                Some(restaurant_id.as_str()),
                query.since,
                limit,
            )?),
            (Some(device_id), None) => self.list_by_device(device_id, query.since, limit),
            (None, Some(restaurant_id)) => self.list_by_restaurant(restaurant_id, query.since, limit),
            (None, None) => self.list_recent(query.since, limit),
        }
    }

    pub fn list_recent(&self, since: Option<i64>, limit: usize) -> BridgeResult<Vec<PrintLog>> {
        Ok(self.storage.list_recent_logs(since, limit)?)
    }

    pub fn list_by_restaurant(
        &self,
        restaurant_id: &str,
        since: Option<i64>,
        limit: usize,
    ) -> BridgeResult<Vec<PrintLog>> {
        Ok(self
            .storage
            .list_logs_by_restaurant(restaurant_id, since, limit)?)
    }

    pub fn list_by_device(
        &self,
        device_id: &str,
        since: Option<i64>,
        limit: usize,
    ) -> BridgeResult<Vec<PrintLog>> {
        Ok(self.storage.list_logs_by_device(device_id, None, since, limit)?)
    }

    pub fn log_for_job(&self, job_id: &str) -> BridgeResult<Option<PrintLog>> {
        Ok(self.storage.get_log_for_job(job_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{FailureReason, JobState, Payload};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` writes, then delegates to real storage
    struct FlakySink {
        inner: BridgeStorage,
        failures: u32,
        calls: AtomicU32,
    }

    impl LogSink for FlakySink {
        fn append_log(&self, log: &PrintLog) -> Result<(), StorageError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(StorageError::Serialization(
                    serde_json::from_str::<()>("disk full").unwrap_err(),
                ));
            }
            self.inner.append_log(log)
        }
    }

    fn finished_job(id: &str, state: JobState) -> PrintJob {
        let mut job = PrintJob::new(id, "r1", "d1", Payload::from("receipt"), 100);
        job.state = state;
        job.finished_at = Some(200);
        if state == JobState::Failed {
            job.failure = Some(FailureReason::AckTimeout);
        }
        job
    }

    fn flaky(failures: u32, attempts: u32) -> (Arc<FlakySink>, LogRecorder) {
        let storage = BridgeStorage::open_in_memory().unwrap();
        let sink = Arc::new(FlakySink {
            inner: storage.clone(),
            failures,
            calls: AtomicU32::new(0),
        });
        let recorder = LogRecorder::with_sink(sink.clone(), storage, attempts)
            .with_retry_delay(Duration::from_millis(1));
        (sink, recorder)
    }

    #[tokio::test]
    async fn records_terminal_job() {
        let recorder = LogRecorder::new(BridgeStorage::open_in_memory().unwrap(), 3);
        let job = finished_job("j1", JobState::Failed);
        let log = recorder.record(&job).await.unwrap();

        assert_eq!(log.job_id, "j1");
        assert_eq!(log.state, JobState::Failed);
        assert_eq!(log.failure, Some(FailureReason::AckTimeout));
        assert_eq!(log.timestamp, 200);
        assert_eq!(log.payload_len, 7);
        assert_eq!(recorder.log_for_job("j1").unwrap(), Some(log));
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let (sink, recorder) = flaky(2, 3);
        recorder
            .record(&finished_job("j1", JobState::Acknowledged))
            .await
            .unwrap();
        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
        assert!(recorder.log_for_job("j1").unwrap().is_some());
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let (sink, recorder) = flaky(10, 3);
        let err = recorder
            .record(&finished_job("j1", JobState::Acknowledged))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::LogPersistFailure { attempts: 3, .. }));
        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
        assert!(recorder.log_for_job("j1").unwrap().is_none());
    }

    #[tokio::test]
    async fn second_record_for_same_job_is_rejected() {
        let recorder = LogRecorder::new(BridgeStorage::open_in_memory().unwrap(), 3);
        let job = finished_job("j1", JobState::Expired);
        recorder.record(&job).await.unwrap();
        let err = recorder.record(&job).await.unwrap_err();
        assert!(matches!(err, BridgeError::LogPersistFailure { attempts: 1, .. }));

        let all = recorder.query(&PrintLogQuery::default()).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn query_filters() {
        let storage = BridgeStorage::open_in_memory().unwrap();
        let recorder = LogRecorder::new(storage, 1);
        for (id, restaurant, device) in [("j1", "r1", "d1"), ("j2", "r2", "d2"), ("j3", "r1", "d3")] {
            let mut job = PrintJob::new(id, restaurant, device, Payload::from("x"), 1);
            job.state = JobState::Acknowledged;
            job.finished_at = Some(10);
            recorder.record(&job).await.unwrap();
        }

        let by_restaurant = recorder
            .query(&PrintLogQuery {
                restaurant_id: Some("r1".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_restaurant.len(), 2);

        let by_device = recorder
            .query(&PrintLogQuery {
                device_id: Some("d2".into()),
                restaurant_id: Some("r1".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(by_device.is_empty());

        let limited = recorder
            .query(&PrintLogQuery {
                limit: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn combined_filter_fills_the_limit() {
        let recorder = LogRecorder::new(BridgeStorage::open_in_memory().unwrap(), 1);
        for (id, restaurant, finished) in [("j1", "r1", 10), ("j2", "r1", 20), ("j3", "r2", 30)] {
            let mut job = PrintJob::new(id, restaurant, "d1", Payload::from("x"), 1);
            job.state = JobState::Acknowledged;
            job.finished_at = Some(finished);
            recorder.record(&job).await.unwrap();
        }

        let logs = recorder
            .query(&PrintLogQuery {
                device_id: Some("d1".into()),
                restaurant_id: Some("r1".into()),
                limit: Some(2),
                ..Default::default()
            })
            .unwrap();
        let jobs: Vec<&str> = logs.iter().map(|l| l.job_id.as_str()).collect();
        assert_eq!(jobs, vec!["j2", "j1"]);
    }
}
