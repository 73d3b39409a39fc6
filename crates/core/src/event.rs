// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle notifications handed to the outbound dispatcher.

use crate::aggregate::{BuildStatus, MatrixEntry};
use crate::build::Build;
use crate::id::{BuildId, JobId};
use crate::job::{Job, JobState};
use serde::{Deserialize, Serialize};

/// Snapshot of a job carried by job events.
///
/// Everything but the configuration and log, so aggregation can work from
/// snapshots without copying either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPayload {
    pub id: JobId,
    pub build_id: BuildId,
    pub number: String,
    pub state: JobState,
    pub allow_failure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queued_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<String>,
}

impl From<&Job> for JobPayload {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            build_id: job.build_id.clone(),
            number: job.number.clone(),
            state: job.state.clone(),
            allow_failure: job.allow_failure,
            queued_at_ms: job.queued_at_ms,
            started_at_ms: job.started_at_ms,
            finished_at_ms: job.finished_at_ms,
            worker: job.worker.clone(),
        }
    }
}

impl MatrixEntry for JobPayload {
    fn id(&self) -> &JobId {
        &self.id
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    fn allow_failure(&self) -> bool {
        self.allow_failure
    }

    fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    fn finished_at_ms(&self) -> Option<u64> {
        self.finished_at_ms
    }
}

/// Snapshot of a build's derived status carried by build events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPayload {
    pub id: BuildId,
    pub number: String,
    pub state: JobState,
    pub finished: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
}

impl BuildPayload {
    pub fn new(build: &Build, status: &BuildStatus) -> Self {
        Self {
            id: build.id.clone(),
            number: build.number().to_string(),
            state: status.state.clone(),
            finished: status.finished,
            duration_secs: status.duration_secs,
        }
    }
}

/// Named lifecycle events.
///
/// Serializes as `{"type": "job:started", ...fields}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "job:queued")]
    JobQueued { job: JobPayload },

    #[serde(rename = "job:started")]
    JobStarted { job: JobPayload },

    #[serde(rename = "job:finished")]
    JobFinished { job: JobPayload },

    /// Incremental log output; `chunk` is only the newly appended text
    #[serde(rename = "job:log")]
    JobLog { job_id: JobId, chunk: String },

    #[serde(rename = "build:started")]
    BuildStarted { build: BuildPayload },

    #[serde(rename = "build:finished")]
    BuildFinished { build: BuildPayload },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::JobQueued { .. } => "job:queued",
            Event::JobStarted { .. } => "job:started",
            Event::JobFinished { .. } => "job:finished",
            Event::JobLog { .. } => "job:log",
            Event::BuildStarted { .. } => "build:started",
            Event::BuildFinished { .. } => "build:finished",
        }
    }

    /// One-line summary for log output.
    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            Event::JobQueued { job } | Event::JobStarted { job } | Event::JobFinished { job } => {
                format!("{t} id={} number={} state={}", job.id, job.number, job.state)
            }
            Event::JobLog { job_id, chunk } => format!("{t} id={job_id} bytes={}", chunk.len()),
            Event::BuildStarted { build } | Event::BuildFinished { build } => {
                format!("{t} id={} number={} state={}", build.id, build.number, build.state)
            }
        }
    }

    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            Event::JobQueued { job } | Event::JobStarted { job } | Event::JobFinished { job } => {
                Some(&job.id)
            }
            Event::JobLog { job_id, .. } => Some(job_id),
            Event::BuildStarted { .. } | Event::BuildFinished { .. } => None,
        }
    }

    pub fn build_id(&self) -> Option<&BuildId> {
        match self {
            Event::JobQueued { job } | Event::JobStarted { job } | Event::JobFinished { job } => {
                Some(&job.build_id)
            }
            Event::JobLog { .. } => None,
            Event::BuildStarted { build } | Event::BuildFinished { build } => Some(&build.id),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
