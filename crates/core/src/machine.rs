// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle state machine.
//!
//! Every operation mutates the job in place and returns the effects the
//! caller must execute, in order. Nothing here performs I/O.

use crate::effect::Effect;
use crate::event::{Event, JobPayload};
use crate::job::{Job, JobState};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("a job cannot move back to created")]
    ReentersCreated,
    #[error("finish needs a result or a state")]
    MissingOutcome,
}

/// Inputs that move a job between states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Start,
    Finish(JobState),
}

impl JobEvent {
    /// Resolve the state this event leads to from `from`.
    ///
    /// Every state accepts every event (restarts and late reports are
    /// legal); only a move back to `created` is refused.
    pub fn target(&self, from: &JobState) -> Result<JobState, TransitionError> {
        let to = match self {
            JobEvent::Start => JobState::Started,
            JobEvent::Finish(JobState::Created) => return Err(TransitionError::ReentersCreated),
            JobEvent::Finish(state) => state.clone(),
        };
        tracing::trace!(%from, %to, "job transition");
        Ok(to)
    }
}

/// What a worker reports when it picks up a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartPayload {
    pub started_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<String>,
}

impl StartPayload {
    pub fn new(started_at_ms: u64) -> Self {
        Self { started_at_ms, worker: None }
    }

    crate::setters! {
        option {
            worker: String,
        }
    }
}

/// What a worker reports when a job is done.
///
/// `result` is the legacy outcome (`0`, `1`, or a state name); `state` is
/// the explicit outcome and wins when both are given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinishPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub finished_at_ms: u64,
}

impl FinishPayload {
    /// Finish with an explicit state.
    pub fn with_state(state: impl Into<String>, finished_at_ms: u64) -> Self {
        Self { result: None, state: Some(state.into()), finished_at_ms }
    }

    /// Finish with a legacy result code.
    pub fn with_result(result: impl Into<Value>, finished_at_ms: u64) -> Self {
        Self { result: Some(result.into()), state: None, finished_at_ms }
    }

    /// The state this payload finishes a job with.
    pub fn outcome(&self) -> Result<JobState, TransitionError> {
        if let Some(state) = &self.state {
            return Ok(JobState::from_name(state));
        }
        self.result.as_ref().map(map_legacy_result).ok_or(TransitionError::MissingOutcome)
    }
}

/// Map a legacy result value to a state.
///
/// Numbers and all-digit strings are result codes: `0` passed, `1` failed.
/// Any other code, and any other text, is kept verbatim.
pub fn map_legacy_result(result: &Value) -> JobState {
    let text = match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return JobState::from_name(&text);
    }
    match text.trim_start_matches('0') {
        "" => JobState::Passed,
        "1" => JobState::Failed,
        _ => JobState::Other(text),
    }
}

/// Mark a job as waiting for a worker. Build status does not change, so
/// nothing propagates.
pub fn enqueue(job: &mut Job, now_ms: u64) -> Vec<Effect> {
    job.state = JobState::Queued;
    job.queued_at_ms = Some(now_ms);
    vec![Effect::Notify { event: Event::JobQueued { job: JobPayload::from(&*job) } }]
}

/// A worker picked up the job. Starting again is a restart: the previous
/// run's log is dropped.
pub fn start(job: &mut Job, payload: StartPayload) -> Result<Vec<Effect>, TransitionError> {
    let to = JobEvent::Start.target(&job.state)?;
    job.log.clear();
    job.started_at_ms = Some(payload.started_at_ms);
    job.worker = payload.worker;
    job.state = to;

    let event = Event::JobStarted { job: JobPayload::from(&*job) };
    Ok(vec![
        Effect::Notify { event: event.clone() },
        Effect::Propagate { build_id: job.build_id.clone(), event },
    ])
}

/// The job is done. The job is left untouched when the payload is refused.
pub fn finish(job: &mut Job, payload: FinishPayload) -> Result<Vec<Effect>, TransitionError> {
    let to = JobEvent::Finish(payload.outcome()?).target(&job.state)?;
    job.state = to;
    job.finished_at_ms = Some(payload.finished_at_ms);

    let event = Event::JobFinished { job: JobPayload::from(&*job) };
    Ok(vec![
        Effect::AddTags { job_id: job.id.clone() },
        Effect::Notify { event: event.clone() },
        Effect::Propagate { build_id: job.build_id.clone(), event },
    ])
}

/// Append output; the event carries only the new chunk.
pub fn append_log(job: &mut Job, chunk: &str) -> Vec<Effect> {
    job.log.push_str(chunk);
    vec![Effect::Notify { event: Event::JobLog { job_id: job.id.clone(), chunk: chunk.to_string() } }]
}

/// Deprecated: outcomes are reported through [`finish`].
pub fn set_result(job: &Job, result: &Value) -> Vec<Effect> {
    tracing::warn!(
        job_id = %job.id,
        %result,
        "set_result is deprecated and ignored; report the outcome with finish"
    );
    Vec::new()
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
