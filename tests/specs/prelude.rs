// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for workspace specs.

pub use ci_adapters::{ChannelSink, EventBus, FakeEventSink, FakeTagger};
pub use ci_core::machine::{FinishPayload, StartPayload};
pub use ci_core::{BuildAttrs, BuildConfig, BuildId, Clock, Event, FakeClock, Job, JobId, JobState};
pub use ci_engine::{EngineConfig, Runtime, RuntimeDeps, RuntimeError};
pub use serde_json::{json, Value};
pub use similar_asserts::assert_eq;
pub use std::time::Duration;

pub type SpecRuntime = Runtime<EventBus, FakeTagger, FakeClock>;

/// A runtime wired to recording adapters.
pub struct World {
    pub runtime: SpecRuntime,
    pub events: FakeEventSink,
    pub tagger: FakeTagger,
    pub clock: FakeClock,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_bus(EventBus::new(), config)
    }

    /// Recording sink registered after whatever `bus` already holds.
    pub fn with_bus(bus: EventBus, config: EngineConfig) -> Self {
        let events = FakeEventSink::new();
        let tagger = FakeTagger::new();
        let clock = FakeClock::new();
        let runtime = Runtime::new(
            RuntimeDeps { sink: bus.with_sink(events.clone()), tagger: tagger.clone() },
            &config,
            clock.clone(),
        );
        Self { runtime, events, tagger, clock }
    }

    /// Create build number 1 for commit `abc123`.
    pub fn build(&self, config: Value) -> BuildId {
        self.runtime.create_build(BuildConfig::from_value(config), BuildAttrs::new("1", "abc123"))
    }

    pub fn job_ids(&self, build_id: &BuildId) -> Vec<JobId> {
        self.runtime.build(build_id).unwrap().jobs
    }

    /// Job configurations in number order, as JSON.
    pub fn configs(&self, build_id: &BuildId) -> Vec<Value> {
        self.runtime
            .jobs(build_id)
            .unwrap()
            .into_iter()
            .map(|job| Value::Object(job.config))
            .collect()
    }

    /// Queue, start and finish a job, each step `step` apart.
    pub fn run_job(&self, job_id: &JobId, outcome: &str, step: Duration) {
        self.runtime.enqueue(job_id).unwrap();
        self.clock.advance(step);
        self.runtime
            .start(job_id, StartPayload::new(self.clock.epoch_ms()).worker("worker-1"))
            .unwrap();
        self.clock.advance(step);
        self.runtime
            .finish(job_id, FinishPayload::with_state(outcome, self.clock.epoch_ms()))
            .unwrap();
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.names()
    }

    pub fn build_events(&self) -> Vec<Event> {
        self.events
            .events()
            .into_iter()
            .filter(|event| matches!(event, Event::BuildStarted { .. } | Event::BuildFinished { .. }))
            .collect()
    }
}
