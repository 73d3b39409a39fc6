// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live builds and the effect executor.
//!
//! Each job sits behind its own mutex: transitions of one job are applied in
//! the order they arrive while other jobs proceed in parallel. Job-level
//! effects (notifications, tagging) run under that mutex, so observers see a
//! job's events in the order its transitions were applied. Propagation runs
//! after the job lock is released, since it reads every job of the build.

use crate::config::EngineConfig;
use crate::error::RuntimeError;
use ci_adapters::{EventSink, Tagger};
use ci_core::machine::{self, FinishPayload, StartPayload};
use ci_core::matrix::{self, Expander};
use ci_core::{
    aggregate, Build, BuildAttrs, BuildConfig, BuildId, BuildPhase, BuildStatus, Clock, Effect,
    Event, Job, JobId, JobPayload, LanguageTable, WebhookTargets,
};
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Adapters the runtime delivers side effects to
pub struct RuntimeDeps<S, T> {
    pub sink: S,
    pub tagger: T,
}

struct BuildEntry {
    build: Build,
    webhooks: WebhookTargets,
    /// Last announced phase; held while announcing so concurrent
    /// propagations announce each phase once, in order
    phase: Mutex<BuildPhase>,
}

/// Owns builds and their jobs, applies transitions and executes effects.
pub struct Runtime<S, T, C: Clock> {
    sink: S,
    tagger: T,
    clock: C,
    table: LanguageTable,
    multi_os: bool,
    builds: RwLock<HashMap<BuildId, Arc<BuildEntry>>>,
    jobs: RwLock<HashMap<JobId, Arc<Mutex<Job>>>>,
}

impl<S, T, C> Runtime<S, T, C>
where
    S: EventSink,
    T: Tagger,
    C: Clock,
{
    pub fn new(deps: RuntimeDeps<S, T>, config: &EngineConfig, clock: C) -> Self {
        Self {
            sink: deps.sink,
            tagger: deps.tagger,
            clock,
            table: config.language_table(),
            multi_os: config.multi_os,
            builds: RwLock::new(HashMap::new()),
            jobs: RwLock::new(HashMap::new()),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Expand `config` into a build with one `created` job per matrix entry.
    pub fn create_build(&self, config: BuildConfig, attrs: BuildAttrs) -> BuildId {
        let specs = Expander::new(&self.table, self.multi_os).expand(&config, &attrs);
        let mut build = Build::new(BuildId::new(), config, attrs);
        let jobs: Vec<Job> = specs
            .into_iter()
            .map(|spec| Job::from_spec(JobId::new(), build.id.clone(), spec))
            .collect();
        build.jobs = jobs.iter().map(|job| job.id.clone()).collect();

        tracing::info!(
            build_id = %build.id,
            number = %build.number(),
            jobs = jobs.len(),
            "created build"
        );

        {
            let mut map = self.jobs.write();
            for job in jobs {
                map.insert(job.id.clone(), Arc::new(Mutex::new(job)));
            }
        }
        let id = build.id.clone();
        let entry = BuildEntry {
            webhooks: WebhookTargets::from_config(&build.config),
            build,
            phase: Mutex::new(BuildPhase::Created),
        };
        self.builds.write().insert(id.clone(), Arc::new(entry));
        id
    }

    pub fn enqueue(&self, job_id: &JobId) -> Result<(), RuntimeError> {
        let now = self.clock.epoch_ms();
        self.transition(job_id, |job| Ok(machine::enqueue(job, now)))
    }

    pub fn start(&self, job_id: &JobId, payload: StartPayload) -> Result<(), RuntimeError> {
        self.transition(job_id, |job| machine::start(job, payload))
    }

    pub fn finish(&self, job_id: &JobId, payload: FinishPayload) -> Result<(), RuntimeError> {
        self.transition(job_id, |job| machine::finish(job, payload))
    }

    pub fn append_log(&self, job_id: &JobId, chunk: &str) -> Result<(), RuntimeError> {
        self.transition(job_id, |job| Ok(machine::append_log(job, chunk)))
    }

    /// Deprecated; logs a warning and changes nothing.
    pub fn set_result(&self, job_id: &JobId, result: &Value) -> Result<(), RuntimeError> {
        self.transition(job_id, |job| Ok(machine::set_result(job, result)))
    }

    /// Current derived status of a build.
    pub fn build_status(&self, build_id: &BuildId) -> Result<BuildStatus, RuntimeError> {
        let entry = self.build_entry(build_id)?;
        Ok(self.status_of(&entry)?)
    }

    pub fn build(&self, build_id: &BuildId) -> Result<Build, RuntimeError> {
        Ok(self.build_entry(build_id)?.build.clone())
    }

    pub fn job(&self, job_id: &JobId) -> Result<Job, RuntimeError> {
        Ok(self.job_handle(job_id)?.lock().clone())
    }

    /// Jobs of a build in number order.
    pub fn jobs(&self, build_id: &BuildId) -> Result<Vec<Job>, RuntimeError> {
        let entry = self.build_entry(build_id)?;
        entry.build.jobs.iter().map(|id| self.job(id)).collect()
    }

    /// Jobs of a build whose configuration agrees with `filter`.
    pub fn filter_matrix(
        &self,
        build_id: &BuildId,
        filter: &Map<String, Value>,
    ) -> Result<Vec<Job>, RuntimeError> {
        let jobs = self.jobs(build_id)?;
        Ok(matrix::filter_matrix(&jobs, filter).into_iter().cloned().collect())
    }

    /// Webhook URLs that should receive `event_name` for this build.
    pub fn webhook_targets(
        &self,
        build_id: &BuildId,
        event_name: &str,
    ) -> Result<Vec<String>, RuntimeError> {
        Ok(self.build_entry(build_id)?.webhooks.for_event(event_name).to_vec())
    }

    // ── internals ───────────────────────────────────────────────────────────

    /// Apply `op` under the job's lock and execute its job-level effects
    /// there; propagation follows once the lock is released.
    ///
    /// A refused transition leaves the job unchanged and runs nothing.
    fn transition<F>(&self, job_id: &JobId, op: F) -> Result<(), RuntimeError>
    where
        F: FnOnce(&mut Job) -> Result<Vec<Effect>, machine::TransitionError>,
    {
        let handle = self.job_handle(job_id)?;
        let propagations = {
            let mut job = handle.lock();
            let effects = op(&mut job).inspect_err(|e| {
                tracing::warn!(job_id = %job_id, state = %job.state, error = %e, "transition refused");
            })?;
            let (propagations, local): (Vec<Effect>, Vec<Effect>) =
                effects.into_iter().partition(|e| matches!(e, Effect::Propagate { .. }));
            for effect in local {
                self.execute(effect, Some(&*job));
            }
            propagations
        };

        for effect in propagations {
            self.execute(effect, None);
        }
        Ok(())
    }

    /// Execute one effect with tracing. Failures are logged; the transition
    /// that produced the effect stands.
    fn execute(&self, effect: Effect, job: Option<&Job>) {
        let info = effect
            .fields()
            .into_iter()
            .map(|(key, val)| format!("{key}={val}"))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!("executing effect={} {}", effect.name(), info);

        match effect {
            Effect::Notify { event } => self.publish(&event),
            Effect::AddTags { job_id } => match job {
                Some(job) => {
                    if let Err(e) = self.tagger.add_tags(job) {
                        tracing::warn!(job_id = %job_id, error = %e, "tagging failed");
                    }
                }
                None => tracing::warn!(job_id = %job_id, "no job to tag"),
            },
            Effect::Propagate { build_id, event } => self.propagate(&build_id, &event),
        }
    }

    fn publish(&self, event: &Event) {
        tracing::debug!("{}", event.log_summary());
        if let Err(e) = self.sink.publish(event) {
            tracing::warn!(event = event.name(), error = %e, "event delivery failed");
        }
    }

    /// Recompute the build's status after a job event and announce any
    /// phase change.
    fn propagate(&self, build_id: &BuildId, event: &Event) {
        let entry = match self.build_entry(build_id) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::error!(error = %e, event = event.name(), "cannot propagate job event");
                return;
            }
        };

        let mut phase = entry.phase.lock();
        let status = match self.status_of(&entry) {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(build_id = %build_id, error = %e, "build status unavailable");
                return;
            }
        };
        for build_event in phase.advance(&entry.build, &status) {
            self.publish(&build_event);
        }
    }

    fn status_of(&self, entry: &BuildEntry) -> Result<BuildStatus, ci_core::AggregateError> {
        let snapshots: Vec<JobPayload> = {
            let jobs = self.jobs.read();
            entry
                .build
                .jobs
                .iter()
                .filter_map(|id| jobs.get(id))
                .map(|job| JobPayload::from(&*job.lock()))
                .collect()
        };
        aggregate(&snapshots, entry.build.fast_finish())
    }

    fn build_entry(&self, build_id: &BuildId) -> Result<Arc<BuildEntry>, RuntimeError> {
        self.builds.read().get(build_id).cloned().ok_or_else(|| RuntimeError::BuildNotFound(build_id.clone()))
    }

    fn job_handle(&self, job_id: &JobId) -> Result<Arc<Mutex<Job>>, RuntimeError> {
        self.jobs.read().get(job_id).cloned().ok_or_else(|| RuntimeError::JobNotFound(job_id.clone()))
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
