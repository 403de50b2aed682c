//! Print log model (immutable audit record of a finished job)

use serde::{Deserialize, Serialize};

use super::print_job::{FailureReason, JobState, PrintJob};

/// One record per job, written on its terminal transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintLog {
    pub id: i64,
    pub job_id: String,
    pub restaurant_id: String,
    pub device_id: String,
    /// Time of the terminal transition
    pub timestamp: i64,
    pub submitted_at: i64,
    pub state: JobState,
    pub failure: Option<FailureReason>,
    pub detail: Option<String>,
    pub payload_len: usize,
}

impl PrintLog {
    /// Build the log entry for a job that has reached a terminal state
    pub fn from_job(id: i64, job: &PrintJob) -> Self {
        Self {
            id,
            job_id: job.id.clone(),
            restaurant_id: job.restaurant_id.clone(),
            device_id: job.device_id.clone(),
            timestamp: job.finished_at.unwrap_or(job.submitted_at),
            submitted_at: job.submitted_at,
            state: job.state,
            failure: job.failure,
            detail: job.detail.clone(),
            payload_len: job.payload.len(),
        }
    }
}

/// Print log query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrintLogQuery {
    pub restaurant_id: Option<String>,
    pub device_id: Option<String>,
    /// Only entries at or after this timestamp (millis)
    pub since: Option<i64>,
    pub limit: Option<usize>,
}
