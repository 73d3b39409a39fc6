// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What observers receive: payloads, log chunks and webhook routing.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn job_events_carry_snapshots_without_config() {
    let world = World::new();
    let build_id = world.build(json!({"rvm": ["3.2"], "script": "rake"}));
    let ids = world.job_ids(&build_id);

    world.runtime.start(&ids[0], StartPayload::new(world.clock.epoch_ms()).worker("w-9")).unwrap();

    let started = world.events.named("job:started");
    let payload = serde_json::to_value(&started[0]).unwrap();
    assert_eq!(payload["type"], json!("job:started"));
    assert_eq!(payload["job"]["id"], json!(ids[0].as_str()));
    assert_eq!(payload["job"]["build_id"], json!(build_id.as_str()));
    assert_eq!(payload["job"]["number"], json!("1.1"));
    assert_eq!(payload["job"]["state"], json!("started"));
    assert_eq!(payload["job"]["worker"], json!("w-9"));
    assert!(payload["job"].get("config").is_none());
}

#[test]
fn log_events_carry_only_new_output() {
    let world = World::new();
    let build_id = world.build(json!({"rvm": ["3.2"]}));
    let ids = world.job_ids(&build_id);

    for chunk in ["$ bundle install\n", "Fetching gems\n", "done\n"] {
        world.runtime.append_log(&ids[0], chunk).unwrap();
    }

    let chunks: Vec<String> = world
        .events
        .named("job:log")
        .into_iter()
        .filter_map(|event| match event {
            Event::JobLog { chunk, .. } => Some(chunk),
            _ => None,
        })
        .collect();
    assert_eq!(chunks.join("").as_str(), "$ bundle install\nFetching gems\ndone\n");
    assert_eq!(chunks.len(), 3);
    assert_eq!(world.runtime.job(&ids[0]).unwrap().log.as_str(), "$ bundle install\nFetching gems\ndone\n");
}

#[test]
fn build_finished_payload() {
    let world = World::new();
    let build_id = world.build(json!({"rvm": ["2.7", "3.2"]}));
    for id in world.job_ids(&build_id) {
        world.run_job(&id, "passed", Duration::from_secs(30));
    }

    let finished = world.events.named("build:finished");
    assert_eq!(
        serde_json::to_value(&finished[0]).unwrap(),
        json!({
            "type": "build:finished",
            "build": {
                "id": build_id.as_str(),
                "number": "1",
                "state": "passed",
                "finished": true,
                "duration_secs": 60,
            }
        })
    );
}

#[test]
fn webhook_routing_per_build() {
    let world = World::new();
    let quiet = world.build(json!({
        "rvm": ["3.2"],
        "notifications": {"webhooks": ["http://a.example/hook", "http://b.example/hook"]},
    }));
    let chatty = world.build(json!({
        "rvm": ["3.2"],
        "notifications": {"webhooks": {"urls": "http://c.example/hook", "on_start": true}},
    }));
    let silent = world.build(json!({"rvm": ["3.2"]}));

    assert_eq!(
        world.runtime.webhook_targets(&quiet, "build:finished").unwrap(),
        vec!["http://a.example/hook".to_string(), "http://b.example/hook".to_string()]
    );
    assert!(world.runtime.webhook_targets(&quiet, "build:started").unwrap().is_empty());
    assert_eq!(
        world.runtime.webhook_targets(&chatty, "build:started").unwrap(),
        vec!["http://c.example/hook".to_string()]
    );
    assert!(world.runtime.webhook_targets(&silent, "build:finished").unwrap().is_empty());
}

#[test]
fn failing_observer_does_not_block_others() {
    let broken = FakeEventSink::new();
    broken.set_failing(true);
    let world = World::with_bus(EventBus::new().with_sink(broken.clone()), EngineConfig::default());
    let build_id = world.build(json!({"rvm": ["3.2"]}));
    let ids = world.job_ids(&build_id);

    world.run_job(&ids[0], "passed", Duration::from_secs(1));

    assert!(broken.events().is_empty());
    assert_eq!(
        world.event_names(),
        vec!["job:queued", "job:started", "build:started", "job:finished", "build:finished"]
    );
}
