// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job transitions driving build status and build events.

use crate::prelude::*;
use crate::prelude::assert_eq;

fn build_states(world: &World) -> Vec<(&'static str, JobState, bool)> {
    world
        .build_events()
        .into_iter()
        .map(|event| match event {
            Event::BuildStarted { build } => ("build:started", build.state, build.finished),
            Event::BuildFinished { build } => ("build:finished", build.state, build.finished),
            other => panic!("not a build event: {other:?}"),
        })
        .collect()
}

#[test]
fn full_build_event_stream() {
    let world = World::new();
    let build_id = world.build(json!({"rvm": ["2.7", "3.2"]}));
    let ids = world.job_ids(&build_id);

    world.run_job(&ids[0], "passed", Duration::from_secs(5));
    world.runtime.append_log(&ids[1], "compiling\n").unwrap();
    world.run_job(&ids[1], "passed", Duration::from_secs(5));

    assert_eq!(
        world.event_names(),
        vec![
            "job:queued",
            "job:started",
            "build:started",
            "job:finished",
            "job:log",
            "job:queued",
            "job:started",
            "job:finished",
            "build:finished",
        ]
    );
    assert_eq!(
        build_states(&world),
        vec![("build:started", JobState::Created, false), ("build:finished", JobState::Passed, true)]
    );

    let status = world.runtime.build_status(&build_id).unwrap();
    assert_eq!(status.duration_secs, Some(10));
    assert_eq!(world.tagger.tagged(), ids);
}

#[test]
fn allowed_failure_does_not_fail_the_build() {
    let world = World::new();
    let build_id = world.build(json!({
        "rvm": ["3.2", "head"],
        "matrix": {"allow_failures": [{"rvm": "head"}]},
    }));
    let ids = world.job_ids(&build_id);

    world.run_job(&ids[0], "passed", Duration::from_secs(1));
    world.run_job(&ids[1], "errored", Duration::from_secs(1));

    assert_eq!(
        build_states(&world),
        vec![("build:started", JobState::Created, false), ("build:finished", JobState::Passed, true)]
    );
}

#[test]
fn fast_finish_announces_before_allowed_jobs_end() {
    let world = World::new();
    let build_id = world.build(json!({
        "rvm": ["3.2", "head"],
        "matrix": {"fast_finish": true, "allow_failures": [{"rvm": "head"}]},
    }));
    let ids = world.job_ids(&build_id);

    world.runtime.enqueue(&ids[1]).unwrap();
    world.runtime.start(&ids[1], StartPayload::new(world.clock.epoch_ms())).unwrap();
    world.run_job(&ids[0], "failed", Duration::from_secs(1));

    assert_eq!(
        build_states(&world),
        vec![("build:started", JobState::Created, false), ("build:finished", JobState::Failed, true)]
    );
    assert_eq!(world.runtime.job(&ids[1]).unwrap().state, JobState::Started);
}

#[test]
fn errored_outranks_failed() {
    let world = World::new();
    let build_id = world.build(json!({"rvm": ["2.7", "3.2", "3.3"]}));
    let ids = world.job_ids(&build_id);

    world.run_job(&ids[0], "failed", Duration::from_secs(1));
    world.run_job(&ids[1], "errored", Duration::from_secs(1));
    world.run_job(&ids[2], "passed", Duration::from_secs(1));

    assert_eq!(world.runtime.build_status(&build_id).unwrap().state, JobState::Errored);
}

#[test]
fn legacy_workers_report_result_codes() {
    let world = World::new();
    let build_id = world.build(json!({"rvm": ["2.7", "3.2"]}));
    let ids = world.job_ids(&build_id);

    for (id, code) in ids.iter().zip([0, 1]) {
        world.runtime.start(id, StartPayload::new(1)).unwrap();
        world.runtime.finish(id, FinishPayload::with_result(code, 2)).unwrap();
    }

    let states: Vec<JobState> =
        world.runtime.jobs(&build_id).unwrap().into_iter().map(|job| job.state).collect();
    assert_eq!(states, vec![JobState::Passed, JobState::Failed]);
    assert_eq!(world.runtime.build_status(&build_id).unwrap().state, JobState::Failed);
}

#[test]
fn restarting_a_job_reopens_the_build() {
    let world = World::new();
    let build_id = world.build(json!({"rvm": ["3.2"]}));
    let ids = world.job_ids(&build_id);

    world.runtime.start(&ids[0], StartPayload::new(1)).unwrap();
    world.runtime.append_log(&ids[0], "boom\n").unwrap();
    world.runtime.finish(&ids[0], FinishPayload::with_state("failed", 2)).unwrap();
    world.runtime.start(&ids[0], StartPayload::new(3)).unwrap();
    world.runtime.finish(&ids[0], FinishPayload::with_state("passed", 4)).unwrap();

    assert_eq!(
        build_states(&world),
        vec![
            ("build:started", JobState::Started, false),
            ("build:finished", JobState::Failed, true),
            ("build:started", JobState::Started, false),
            ("build:finished", JobState::Passed, true),
        ]
    );
    assert!(world.runtime.job(&ids[0]).unwrap().log.is_empty());
}

#[test]
fn rejected_report_is_an_error_and_leaves_the_job() {
    let world = World::new();
    let build_id = world.build(json!({"rvm": ["3.2"]}));
    let ids = world.job_ids(&build_id);
    world.runtime.start(&ids[0], StartPayload::new(1)).unwrap();

    let err = world.runtime.finish(&ids[0], FinishPayload::with_state("created", 2)).unwrap_err();

    assert!(matches!(err, RuntimeError::Transition(_)));
    assert_eq!(world.runtime.job(&ids[0]).unwrap().state, JobState::Started);
}

#[test]
fn channel_dispatcher_sees_the_same_stream() {
    let (channel, mut rx) = ChannelSink::channel();
    let world = World::with_bus(EventBus::new().with_sink(channel), EngineConfig::default());
    let build_id = world.build(json!({"rvm": ["3.2"]}));
    let ids = world.job_ids(&build_id);

    world.run_job(&ids[0], "passed", Duration::from_secs(1));

    let mut dispatched = Vec::new();
    while let Ok(event) = rx.try_recv() {
        dispatched.push(event);
    }
    assert_eq!(dispatched, world.events.events());
}
