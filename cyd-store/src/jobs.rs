//! The model-run job queue.
//!
//! Jobs are appended, optionally replaced in place by id, and cleared
//! in bulk. The queue itself is pure in-memory state; mirroring it to
//! durable storage after each mutation is the orchestrator's explicit
//! side effect, which keeps these operations directly testable.

use cyd_core::selection::Crop;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

/// A queued model run for one crop/year/day combination.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct QueuedJob {
    pub id: u64,
    pub crop: Crop,
    pub year: i32,
    pub day: String,
    pub status: JobStatus,
}

/// Append a job to the queue.
pub fn enqueue(queue: &mut Vec<QueuedJob>, job: QueuedJob) {
    queue.push(job);
}

/// Replace the job with a matching id in place. Returns false (and
/// leaves the queue untouched) when the id is unknown.
pub fn update_by_id(queue: &mut [QueuedJob], job: QueuedJob) -> bool {
    for slot in queue.iter_mut() {
        if slot.id == job.id {
            *slot = job;
            return true;
        }
    }
    false
}
