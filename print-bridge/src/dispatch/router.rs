//! Dispatch router
//!
//! Each device gets a lane: an unbounded queue drained by a single task.
//! The lane forwards one job at a time and waits for its verdict before
//! taking the next, so a device never has more than one job in flight and
//! jobs leave in submission order. Unrelated devices never wait on each other.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use shared::models::{Device, FailureReason, JobState, Payload, PrintJob};
use shared::util::now_millis;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::connection::{ConnectionManager, SendError};
use crate::error::{BridgeError, BridgeResult};
use crate::recorder::LogRecorder;
use crate::registry::DeviceRegistry;
use crate::utils::validation::validate_payload;

/// A job plus the watch channel that announces its state changes
struct JobCell {
    job: Mutex<PrintJob>,
    state_tx: watch::Sender<JobState>,
}

impl JobCell {
    fn new(job: PrintJob) -> Self {
        let (state_tx, _) = watch::channel(job.state);
        Self {
            job: Mutex::new(job),
            state_tx,
        }
    }

    fn snapshot(&self) -> PrintJob {
        self.job.lock().clone()
    }

    /// Apply a forward transition; `None` if the job already moved on
    fn transition(
        &self,
        next: JobState,
        failure: Option<FailureReason>,
        detail: Option<String>,
    ) -> Option<PrintJob> {
        let mut job = self.job.lock();
        if !job.state.can_transition_to(next) {
            return None;
        }
        let now = now_millis();
        job.state = next;
        if next == JobState::Sent {
            job.sent_at = Some(now);
        }
        if next.is_terminal() {
            job.finished_at = Some(now);
            job.failure = failure;
            job.detail = detail;
        }
        Some(job.clone())
    }

    fn publish(&self, state: JobState) {
        self.state_tx.send_replace(state);
    }
}

/// Queue feeding a device's lane task
///
/// `disabled` gates the `queued -> sent` step: dispatch reads it and moves
/// the job under its lock, and disabling sets it under the same lock, so
/// once a disable has begun no further job leaves for the device.
struct Lane {
    tx: mpsc::UnboundedSender<Arc<JobCell>>,
    disabled: Arc<Mutex<bool>>,
}

struct RouterInner {
    registry: Arc<DeviceRegistry>,
    connections: Arc<ConnectionManager>,
    recorder: Arc<LogRecorder>,
    jobs: DashMap<String, Arc<JobCell>>,
    lanes: DashMap<String, Lane>,
    shutdown: CancellationToken,
}

#[derive(Clone)]
pub struct DispatchRouter {
    inner: Arc<RouterInner>,
}

impl DispatchRouter {
    pub fn new(
        registry: Arc<DeviceRegistry>,
        connections: Arc<ConnectionManager>,
        recorder: Arc<LogRecorder>,
    ) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                registry,
                connections,
                recorder,
                jobs: DashMap::new(),
                lanes: DashMap::new(),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Accept a job for `device_id` and queue it on the device's lane
    ///
    /// The device must exist, belong to `restaurant_id` and be enabled. An
    /// offline device is not an error here; the job fails at dispatch.
    pub fn submit(
        &self,
        restaurant_id: &str,
        device_id: &str,
        payload: Payload,
    ) -> BridgeResult<PrintJob> {
        validate_payload(payload.len())?;

        let device = self.inner.registry.get(device_id)?;
        if device.restaurant_id != restaurant_id {
            return Err(BridgeError::DeviceMismatch {
                device_id: device_id.to_string(),
                restaurant_id: restaurant_id.to_string(),
            });
        }
        if device.disabled {
            return Err(BridgeError::DeviceDisabled(device_id.to_string()));
        }

        let job = PrintJob::new(
            uuid::Uuid::new_v4().to_string(),
            restaurant_id,
            device_id,
            payload,
            now_millis(),
        );
        let cell = Arc::new(JobCell::new(job.clone()));
        self.inner.jobs.insert(job.id.clone(), cell.clone());
        self.enqueue(device_id, cell);

        tracing::info!(
            job_id = %job.id,
            device_id = %device_id,
            restaurant_id = %restaurant_id,
            payload_len = job.payload.len(),
            "Print job queued"
        );
        Ok(job)
    }

    fn enqueue(&self, device_id: &str, cell: Arc<JobCell>) {
        let lane = match self.inner.lanes.entry(device_id.to_string()) {
            Entry::Occupied(entry) => entry.get().tx.clone(),
            Entry::Vacant(entry) => {
                let (tx, rx) = mpsc::unbounded_channel();
                let disabled = Arc::new(Mutex::new(false));
                entry.insert(Lane {
                    tx: tx.clone(),
                    disabled: disabled.clone(),
                });
                tokio::spawn(run_lane(
                    self.inner.clone(),
                    device_id.to_string(),
                    disabled,
                    rx,
                ));
                tx
            }
        };
        if lane.send(cell.clone()).is_err() {
            // Lane task is gone (shutdown); the job can never be dispatched
            let inner = self.inner.clone();
            tokio::spawn(async move {
                finish(
                    &inner,
                    &cell,
                    JobState::Failed,
                    Some(FailureReason::SendFailure),
                    Some("dispatcher stopped".into()),
                )
                .await;
            });
        }
    }

    pub fn job(&self, job_id: &str) -> BridgeResult<PrintJob> {
        self.inner
            .jobs
            .get(job_id)
            .map(|cell| cell.snapshot())
            .ok_or_else(|| BridgeError::JobNotFound(job_id.to_string()))
    }

    /// Wait until the job is terminal; its log has been recorded by then
    pub async fn wait(&self, job_id: &str) -> BridgeResult<PrintJob> {
        let cell = self
            .inner
            .jobs
            .get(job_id)
            .map(|cell| Arc::clone(cell.value()))
            .ok_or_else(|| BridgeError::JobNotFound(job_id.to_string()))?;

        let mut rx = cell.state_tx.subscribe();
        // Sender lives in `cell`, so the channel cannot close while we wait
        let _ = rx.wait_for(|state| state.is_terminal()).await;
        Ok(cell.snapshot())
    }

    /// Withdraw a queued job
    pub async fn cancel(&self, job_id: &str) -> BridgeResult<PrintJob> {
        let cell = self
            .inner
            .jobs
            .get(job_id)
            .map(|cell| Arc::clone(cell.value()))
            .ok_or_else(|| BridgeError::JobNotFound(job_id.to_string()))?;

        match finish(
            &self.inner,
            &cell,
            JobState::Expired,
            Some(FailureReason::Cancelled),
            None,
        )
        .await
        {
            Some(job) => {
                tracing::info!(job_id = %job_id, "Print job cancelled");
                Ok(job)
            }
            None => Err(BridgeError::JobNotCancellable {
                job_id: job_id.to_string(),
                state: cell.snapshot().state,
            }),
        }
    }

    /// Disable the device, expire its queued jobs and drop its channel
    ///
    /// A job already in flight fails once the channel closes. The device's
    /// lane is removed; its task exits after draining what is left.
    pub async fn disable_device(&self, device_id: &str) -> BridgeResult<Device> {
        let gate = self
            .inner
            .lanes
            .get(device_id)
            .map(|lane| Arc::clone(&lane.disabled));
        let device = match gate {
            Some(gate) => {
                let mut disabled = gate.lock();
                let device = self.inner.registry.disable(device_id)?;
                *disabled = true;
                device
            }
            None => self.inner.registry.disable(device_id)?,
        };
        self.inner.lanes.remove(device_id);

        let queued: Vec<Arc<JobCell>> = self
            .inner
            .jobs
            .iter()
            .filter(|entry| {
                let job = entry.job.lock();
                job.device_id == device_id && job.state == JobState::Queued
            })
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut expired = 0usize;
        for cell in queued {
            if finish(
                &self.inner,
                &cell,
                JobState::Expired,
                Some(FailureReason::DeviceDisabled),
                None,
            )
            .await
            .is_some()
            {
                expired += 1;
            }
        }

        self.inner.connections.detach(device_id);
        tracing::info!(device_id = %device_id, expired, "Device disabled, queued jobs expired");
        Ok(device)
    }

    /// Drop terminal jobs finished before `now - older_than`
    pub fn prune_finished(&self, older_than: Duration) -> usize {
        let cutoff = now_millis() - older_than.as_millis() as i64;
        let before = self.inner.jobs.len();
        self.inner.jobs.retain(|_, cell| {
            let job = cell.job.lock();
            !(job.state.is_terminal() && job.finished_at.is_some_and(|t| t <= cutoff))
        });
        let pruned = before.saturating_sub(self.inner.jobs.len());
        if pruned > 0 {
            tracing::debug!(pruned, "Pruned finished print jobs");
        }
        pruned
    }

    /// Number of jobs currently held in memory
    pub fn job_count(&self) -> usize {
        self.inner.jobs.len()
    }

    /// Stop all lanes; queued jobs stay queued
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.inner.lanes.clear();
    }
}

async fn run_lane(
    inner: Arc<RouterInner>,
    device_id: String,
    disabled: Arc<Mutex<bool>>,
    mut rx: mpsc::UnboundedReceiver<Arc<JobCell>>,
) {
    tracing::debug!(device_id = %device_id, "Dispatch lane started");
    loop {
        let cell = tokio::select! {
            _ = inner.shutdown.cancelled() => break,
            next = rx.recv() => match next {
                Some(cell) => cell,
                None => break,
            },
        };
        dispatch(&inner, &device_id, &disabled, &cell).await;
    }
    tracing::debug!(device_id = %device_id, "Dispatch lane stopped");
}

/// What dispatch decided while holding the lane gate
enum Admission {
    Send(PrintJob),
    Finish(JobState, FailureReason, Option<String>),
    Skip,
}

fn admit(
    inner: &RouterInner,
    device_id: &str,
    disabled: &Mutex<bool>,
    cell: &JobCell,
) -> Admission {
    let disabled = disabled.lock();
    if *disabled {
        return Admission::Finish(JobState::Expired, FailureReason::DeviceDisabled, None);
    }
    match inner.registry.get(device_id) {
        Ok(device) if device.disabled => {
            return Admission::Finish(JobState::Expired, FailureReason::DeviceDisabled, None);
        }
        Ok(_) => {}
        Err(e) => {
            return Admission::Finish(
                JobState::Failed,
                FailureReason::SendFailure,
                Some(e.to_string()),
            );
        }
    }
    if !inner.connections.is_connected(device_id) {
        return Admission::Finish(JobState::Failed, FailureReason::DeviceOffline, None);
    }
    match cell.transition(JobState::Sent, None, None) {
        Some(job) => Admission::Send(job),
        None => Admission::Skip,
    }
}

async fn dispatch(
    inner: &RouterInner,
    device_id: &str,
    disabled: &Mutex<bool>,
    cell: &JobCell,
) {
    let job_id = {
        let job = cell.job.lock();
        if job.state != JobState::Queued {
            // Cancelled or expired while waiting in the lane
            return;
        }
        job.id.clone()
    };

    let sent = match admit(inner, device_id, disabled, cell) {
        Admission::Send(job) => job,
        Admission::Finish(state, reason, detail) => {
            if reason == FailureReason::DeviceOffline {
                tracing::warn!(
                    job_id = %job_id,
                    device_id = %device_id,
                    "Device offline, print job failed"
                );
            }
            finish(inner, cell, state, Some(reason), detail).await;
            return;
        }
        Admission::Skip => return,
    };
    cell.publish(JobState::Sent);

    match inner.connections.send(device_id, &job_id, sent.payload).await {
        Ok(ack) => {
            tracing::info!(job_id = %job_id, device_id = %device_id, "Print job acknowledged");
            finish(inner, cell, JobState::Acknowledged, None, ack.detail).await;
        }
        Err(e) => {
            let (reason, detail) = match e {
                SendError::DeviceOffline => (FailureReason::DeviceOffline, None),
                SendError::AckTimeout => (FailureReason::AckTimeout, None),
                SendError::SendFailure(detail) => (FailureReason::SendFailure, Some(detail)),
            };
            finish(inner, cell, JobState::Failed, Some(reason), detail).await;
        }
    }
}

/// Move a job to a terminal state, record its log, then wake watchers
///
/// Returns `None` when the job was not in a state that allows `state`.
async fn finish(
    inner: &RouterInner,
    cell: &JobCell,
    state: JobState,
    failure: Option<FailureReason>,
    detail: Option<String>,
) -> Option<PrintJob> {
    let job = cell.transition(state, failure, detail)?;
    if let Err(e) = inner.recorder.record(&job).await {
        // Already reported by the recorder; the outcome stands
        tracing::debug!(job_id = %job.id, error = %e, "Print log not recorded");
    }
    cell.publish(state);
    Some(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::DeviceChannel;
    use crate::storage::BridgeStorage;
    use shared::channel::{AckStatus, ServerFrame};
    use shared::models::{DeviceStatus, PrintLogQuery};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixture {
        router: DispatchRouter,
        registry: Arc<DeviceRegistry>,
        connections: Arc<ConnectionManager>,
        recorder: Arc<LogRecorder>,
        device_id: String,
    }

    fn fixture(ack_timeout: Duration) -> Fixture {
        let storage = BridgeStorage::open_in_memory().unwrap();
        let registry = Arc::new(DeviceRegistry::new(storage.clone()));
        let connections = Arc::new(ConnectionManager::new(
            registry.clone(),
            ack_timeout,
            Duration::from_secs(30),
        ));
        let recorder = Arc::new(LogRecorder::new(storage, 3));
        let router = DispatchRouter::new(registry.clone(), connections.clone(), recorder.clone());
        let device_id = registry.register("r1", "Kitchen").unwrap().device.id;
        Fixture {
            router,
            registry,
            connections,
            recorder,
            device_id,
        }
    }

    /// Simulated agent: records arrival order, optionally answers
    struct Agent {
        received: Arc<Mutex<Vec<String>>>,
        max_in_flight: Arc<AtomicUsize>,
    }

    fn connect_agent(f: &Fixture, reply: Option<AckStatus>, delay: Duration) -> Agent {
        let (channel, mut rx) = DeviceChannel::pair(8);
        let session = f.connections.attach(&f.device_id, channel);
        let received = Arc::new(Mutex::new(Vec::new()));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let in_flight = Arc::new(AtomicUsize::new(0));

        let (manager, device_id) = (f.connections.clone(), f.device_id.clone());
        let (seen, max) = (received.clone(), max_in_flight.clone());
        tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                let ServerFrame::Job { job_id, .. } = frame else {
                    continue;
                };
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max.fetch_max(now, Ordering::SeqCst);
                seen.lock().push(job_id.clone());
                tokio::time::sleep(delay).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                if let Some(status) = reply {
                    manager.resolve(&device_id, session, &job_id, status, None);
                }
            }
        });
        Agent {
            received,
            max_in_flight,
        }
    }

    fn logs_for(recorder: &LogRecorder, job_id: &str) -> usize {
        recorder
            .query(&PrintLogQuery::default())
            .unwrap()
            .iter()
            .filter(|l| l.job_id == job_id)
            .count()
    }

    #[tokio::test]
    async fn acknowledged_job_is_logged_once() {
        let f = fixture(Duration::from_secs(2));
        connect_agent(&f, Some(AckStatus::Ack), Duration::ZERO);

        let job = f.router.submit("r1", &f.device_id, Payload::from("receipt")).unwrap();
        assert_eq!(job.state, JobState::Queued);

        let done = f.router.wait(&job.id).await.unwrap();
        assert_eq!(done.state, JobState::Acknowledged);
        assert!(done.sent_at.is_some());
        assert!(done.finished_at.is_some());
        assert_eq!(logs_for(&f.recorder, &job.id), 1);
    }

    #[tokio::test]
    async fn never_connected_device_fails_offline() {
        let f = fixture(Duration::from_secs(1));
        let job = f.router.submit("r1", &f.device_id, Payload::from("x")).unwrap();
        let done = f.router.wait(&job.id).await.unwrap();

        assert_eq!(done.state, JobState::Failed);
        assert_eq!(done.failure, Some(FailureReason::DeviceOffline));
        assert!(done.sent_at.is_none());
        assert_eq!(logs_for(&f.recorder, &job.id), 1);
    }

    #[tokio::test]
    async fn silent_device_times_out() {
        let f = fixture(Duration::from_millis(50));
        connect_agent(&f, None, Duration::ZERO);

        let job = f.router.submit("r1", &f.device_id, Payload::from("x")).unwrap();
        let done = f.router.wait(&job.id).await.unwrap();
        assert_eq!(done.state, JobState::Failed);
        assert_eq!(done.failure, Some(FailureReason::AckTimeout));
        assert_eq!(logs_for(&f.recorder, &job.id), 1);
        // Device is released for the next job
        assert_eq!(f.registry.status(&f.device_id), DeviceStatus::Connected);
    }

    #[tokio::test]
    async fn nack_fails_with_send_failure() {
        let f = fixture(Duration::from_secs(1));
        connect_agent(&f, Some(AckStatus::Nack), Duration::ZERO);

        let job = f.router.submit("r1", &f.device_id, Payload::from("x")).unwrap();
        let done = f.router.wait(&job.id).await.unwrap();
        assert_eq!(done.state, JobState::Failed);
        assert_eq!(done.failure, Some(FailureReason::SendFailure));
    }

    #[tokio::test]
    async fn jobs_are_dispatched_one_at_a_time_in_order() {
        let f = fixture(Duration::from_secs(2));
        let agent = connect_agent(&f, Some(AckStatus::Ack), Duration::from_millis(10));

        let ids: Vec<String> = (0..5)
            .map(|i| {
                f.router
                    .submit("r1", &f.device_id, Payload::from(format!("job {i}").as_str()))
                    .unwrap()
                    .id
            })
            .collect();

        let mut finished = Vec::new();
        for id in &ids {
            finished.push(f.router.wait(id).await.unwrap());
        }

        assert_eq!(*agent.received.lock(), ids);
        assert_eq!(agent.max_in_flight.load(Ordering::SeqCst), 1);
        for pair in finished.windows(2) {
            // Next job is only sent after the previous one is terminal
            assert!(pair[1].sent_at.unwrap() >= pair[0].finished_at.unwrap());
        }
    }

    #[tokio::test]
    async fn submit_rejects_foreign_restaurant_and_disabled_device() {
        let f = fixture(Duration::from_secs(1));
        assert!(matches!(
            f.router.submit("r2", &f.device_id, Payload::from("x")),
            Err(BridgeError::DeviceMismatch { .. })
        ));

        f.registry.disable(&f.device_id).unwrap();
        assert!(matches!(
            f.router.submit("r1", &f.device_id, Payload::from("x")),
            Err(BridgeError::DeviceDisabled(_))
        ));
        assert!(matches!(
            f.router.submit("r1", "missing", Payload::from("x")),
            Err(BridgeError::DeviceNotFound(_))
        ));
        assert_eq!(f.router.job_count(), 0);
    }

    #[tokio::test]
    async fn mismatch_is_reported_before_disabled() {
        let f = fixture(Duration::from_secs(1));
        f.registry.disable(&f.device_id).unwrap();
        assert!(matches!(
            f.router.submit("r2", &f.device_id, Payload::from("x")),
            Err(BridgeError::DeviceMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn disabling_expires_queued_jobs() {
        let f = fixture(Duration::from_secs(2));
        // Agent never answers, so the first job holds the lane
        let agent = connect_agent(&f, None, Duration::ZERO);

        let first = f.router.submit("r1", &f.device_id, Payload::from("a")).unwrap();
        let second = f.router.submit("r1", &f.device_id, Payload::from("b")).unwrap();

        // Wait for the first job to reach the device
        while agent.received.lock().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        f.router.disable_device(&f.device_id).await.unwrap();

        let second = f.router.wait(&second.id).await.unwrap();
        assert_eq!(second.state, JobState::Expired);
        assert_eq!(second.failure, Some(FailureReason::DeviceDisabled));

        let first = f.router.wait(&first.id).await.unwrap();
        assert_eq!(first.state, JobState::Failed);
        assert_eq!(first.failure, Some(FailureReason::SendFailure));

        assert_eq!(agent.received.lock().len(), 1);
        assert!(!f.connections.is_connected(&f.device_id));
        assert_eq!(logs_for(&f.recorder, &second.id), 1);
        // The lane is dropped with the device
        assert!(f.router.inner.lanes.get(&f.device_id).is_none());
    }

    #[tokio::test]
    async fn closed_gate_holds_back_jobs_the_registry_still_allows() {
        let f = fixture(Duration::from_secs(2));
        let agent = connect_agent(&f, Some(AckStatus::Ack), Duration::ZERO);

        let first = f.router.submit("r1", &f.device_id, Payload::from("a")).unwrap();
        assert_eq!(
            f.router.wait(&first.id).await.unwrap().state,
            JobState::Acknowledged
        );

        // A disable holding the lane gate before its registry write lands
        *f.router.inner.lanes.get(&f.device_id).unwrap().disabled.lock() = true;
        let second = f.router.submit("r1", &f.device_id, Payload::from("b")).unwrap();

        let second = f.router.wait(&second.id).await.unwrap();
        assert_eq!(second.state, JobState::Expired);
        assert_eq!(second.failure, Some(FailureReason::DeviceDisabled));
        assert!(second.sent_at.is_none());
        assert_eq!(*agent.received.lock(), vec![first.id]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn disable_racing_dispatch_never_delivers_an_expired_job() {
        for _ in 0..50 {
            let f = fixture(Duration::from_secs(2));
            let agent = connect_agent(&f, Some(AckStatus::Ack), Duration::ZERO);

            let job = f.router.submit("r1", &f.device_id, Payload::from("x")).unwrap();
            f.router.disable_device(&f.device_id).await.unwrap();

            let job = f.router.wait(&job.id).await.unwrap();
            let delivered = agent.received.lock().contains(&job.id);
            match job.state {
                JobState::Expired => {
                    assert_eq!(job.failure, Some(FailureReason::DeviceDisabled));
                    assert!(job.sent_at.is_none());
                    assert!(!delivered);
                }
                // Left before the disable began
                JobState::Acknowledged | JobState::Failed => assert!(job.sent_at.is_some()),
                other => panic!("unexpected state {other:?}"),
            }
            assert_eq!(logs_for(&f.recorder, &job.id), 1);
        }
    }

    #[tokio::test]
    async fn only_queued_jobs_can_be_cancelled() {
        let f = fixture(Duration::from_secs(2));
        connect_agent(&f, None, Duration::ZERO);

        let first = f.router.submit("r1", &f.device_id, Payload::from("a")).unwrap();
        let second = f.router.submit("r1", &f.device_id, Payload::from("b")).unwrap();
        let mut rx = f.router.inner.jobs.get(&first.id).unwrap().state_tx.subscribe();
        rx.wait_for(|s| *s == JobState::Sent).await.unwrap();

        let cancelled = f.router.cancel(&second.id).await.unwrap();
        assert_eq!(cancelled.state, JobState::Expired);
        assert_eq!(cancelled.failure, Some(FailureReason::Cancelled));

        assert!(matches!(
            f.router.cancel(&first.id).await,
            Err(BridgeError::JobNotCancellable { state: JobState::Sent, .. })
        ));
        assert!(matches!(
            f.router.cancel("missing").await,
            Err(BridgeError::JobNotFound(_))
        ));
        assert_eq!(logs_for(&f.recorder, &second.id), 1);
    }

    #[tokio::test]
    async fn pruning_keeps_logs() {
        let f = fixture(Duration::from_secs(1));
        let job = f.router.submit("r1", &f.device_id, Payload::from("x")).unwrap();
        f.router.wait(&job.id).await.unwrap();

        assert_eq!(f.router.prune_finished(Duration::from_secs(3600)), 0);
        assert_eq!(f.router.prune_finished(Duration::ZERO), 1);
        assert!(matches!(f.router.job(&job.id), Err(BridgeError::JobNotFound(_))));
        assert!(f.recorder.log_for_job(&job.id).unwrap().is_some());
    }
}
