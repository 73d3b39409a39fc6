// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build status derived from the states of its jobs.
//!
//! Nothing here is stored: every function recomputes from the job snapshots
//! it is given.

use crate::id::JobId;
use crate::job::{Job, JobState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("job {job} has a state the build cannot rank: {state}")]
    UnknownState { job: JobId, state: JobState },
}

/// What aggregation reads from a job.
pub trait MatrixEntry {
    fn id(&self) -> &JobId;
    fn state(&self) -> &JobState;
    fn allow_failure(&self) -> bool;
    fn started_at_ms(&self) -> Option<u64>;
    fn finished_at_ms(&self) -> Option<u64>;

    /// Run time, when both timestamps are known.
    fn duration_ms(&self) -> Option<u64> {
        match (self.started_at_ms(), self.finished_at_ms()) {
            (Some(started), Some(finished)) => Some(finished.saturating_sub(started)),
            _ => None,
        }
    }
}

impl MatrixEntry for Job {
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

/// Derived status of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatus {
    pub state: JobState,
    /// Some job has been picked up by a worker
    pub started: bool,
    pub finished: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
}

/// Compute the full status of a build.
pub fn aggregate<J: MatrixEntry>(jobs: &[J], fast_finish: bool) -> Result<BuildStatus, AggregateError> {
    Ok(BuildStatus {
        state: matrix_state(jobs)?,
        started: jobs.iter().any(|job| job.state().has_started()),
        finished: matrix_finished(jobs, fast_finish),
        duration_secs: matrix_duration(jobs, fast_finish),
    })
}

/// Whether the build is done.
///
/// With `fast_finish`, jobs that are allowed to fail are not waited for.
/// A build without jobs has nothing that could finish it.
pub fn matrix_finished<J: MatrixEntry>(jobs: &[J], fast_finish: bool) -> bool {
    !jobs.is_empty()
        && jobs
            .iter()
            .filter(|job| !(fast_finish && job.allow_failure()))
            .all(|job| job.state().is_finished())
}

/// The build's state: the highest-ranked job state.
///
/// Ranking, highest first: `errored`, `canceled`, `failed`, `created`,
/// `queued`, `started`, `passed`. A failed, errored or canceled job that is
/// allowed to fail counts as `passed`. An empty matrix is `created`.
pub fn matrix_state<J: MatrixEntry>(jobs: &[J]) -> Result<JobState, AggregateError> {
    let mut worst: Option<(u8, JobState)> = None;
    for job in jobs {
        let vote = match job.state() {
            state if job.allow_failure() && state.is_negative() => JobState::Passed,
            state => state.clone(),
        };
        let Some(rank) = rank(&vote) else {
            return Err(AggregateError::UnknownState {
                job: job.id().clone(),
                state: job.state().clone(),
            });
        };
        if worst.as_ref().map_or(true, |(highest, _)| rank > *highest) {
            worst = Some((rank, vote));
        }
    }
    Ok(worst.map_or(JobState::Created, |(_, state)| state))
}

/// Total run time of all jobs in whole seconds, once the build is finished.
///
/// Jobs missing either timestamp count as zero.
pub fn matrix_duration<J: MatrixEntry>(jobs: &[J], fast_finish: bool) -> Option<u64> {
    if !matrix_finished(jobs, fast_finish) {
        return None;
    }
    let total_ms: u64 = jobs.iter().filter_map(MatrixEntry::duration_ms).sum();
    Some(total_ms / 1000)
}

fn rank(state: &JobState) -> Option<u8> {
    match state {
        JobState::Passed => Some(0),
        JobState::Started => Some(1),
        JobState::Queued => Some(2),
        JobState::Created => Some(3),
        JobState::Failed => Some(4),
        JobState::Canceled => Some(5),
        JobState::Errored => Some(6),
        JobState::Finished | JobState::Other(_) => None,
    }
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
