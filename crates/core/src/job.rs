// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job entity and its state.

use crate::id::{BuildId, JobId};
use crate::matrix::JobSpec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// State of a job.
///
/// Names outside the known set are kept verbatim in [`JobState::Other`]:
/// the state machine stores whatever a worker reports, and aggregation
/// rejects what it cannot rank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    /// Planned, not yet queued
    Created,
    Queued,
    Started,
    Passed,
    Failed,
    /// Infrastructure failure; the code may never have run
    Errored,
    Canceled,
    /// Legacy finished marker from before outcomes had their own states
    Finished,
    Other(String),
}

impl JobState {
    pub fn from_name(name: &str) -> Self {
        match name {
            "created" => JobState::Created,
            "queued" => JobState::Queued,
            "started" => JobState::Started,
            "passed" => JobState::Passed,
            "failed" => JobState::Failed,
            "errored" => JobState::Errored,
            "canceled" => JobState::Canceled,
            "finished" => JobState::Finished,
            other => JobState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobState::Created => "created",
            JobState::Queued => "queued",
            JobState::Started => "started",
            JobState::Passed => "passed",
            JobState::Failed => "failed",
            JobState::Errored => "errored",
            JobState::Canceled => "canceled",
            JobState::Finished => "finished",
            JobState::Other(name) => name,
        }
    }

    /// Whether the job is done running, including the legacy `finished`
    /// marker.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            JobState::Finished
                | JobState::Passed
                | JobState::Failed
                | JobState::Errored
                | JobState::Canceled
        )
    }

    /// Outcomes that fail a build unless the job is allowed to fail.
    pub fn is_negative(&self) -> bool {
        matches!(self, JobState::Failed | JobState::Errored | JobState::Canceled)
    }

    /// Whether the job has been picked up by a worker at some point.
    pub fn has_started(&self) -> bool {
        !matches!(self, JobState::Created | JobState::Queued)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for JobState {
    fn from(name: String) -> Self {
        JobState::from_name(&name)
    }
}

impl From<&str> for JobState {
    fn from(name: &str) -> Self {
        JobState::from_name(name)
    }
}

impl From<JobState> for String {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// A job in a build matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Owning build (back-reference only)
    pub build_id: BuildId,
    pub number: String,
    pub config: Map<String, Value>,
    pub state: JobState,
    /// Fixed at expansion time
    pub allow_failure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queued_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<String>,
    /// Output of the current run; cleared when the job (re)starts
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub log: String,
    pub commit_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl Job {
    /// Materialize a planned job.
    pub fn from_spec(id: JobId, build_id: BuildId, spec: JobSpec) -> Self {
        Self {
            id,
            build_id,
            number: spec.number,
            config: spec.config,
            state: JobState::Created,
            allow_failure: spec.allow_failure,
            queued_at_ms: None,
            started_at_ms: None,
            finished_at_ms: None,
            worker: None,
            log: String::new(),
            commit_id: spec.commit_id,
            repository_id: spec.repository_id,
            branch: spec.branch,
        }
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            id: JobId = "job-1",
            build_id: BuildId = "bld-1",
            number: String = "1.1",
            commit_id: String = "abc123",
        }
        set {
            config: Map<String, Value> = Map::new(),
            state: JobState = JobState::Created,
            allow_failure: bool = false,
            queued_at_ms: Option<u64> = None,
            started_at_ms: Option<u64> = None,
            finished_at_ms: Option<u64> = None,
        }
        option {
            worker: String = None,
            repository_id: String = None,
            branch: String = None,
        }
        computed {
            log: String = String::new(),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
