// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Matrix expansion as seen through a created build.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn ruby_build_with_every_matrix_section() {
    let world = World::new();
    let build_id = world.build(json!({
        "language": "ruby",
        "script": "bundle exec rake",
        "rvm": ["2.7", "3.2"],
        "gemfile": ["gemfiles/rails-6", "gemfiles/rails-7"],
        "env": {"global": ["CI=true"], "matrix": ["DB=pg"]},
        "python": ["3.11"],
        "notifications": {"email": false},
        "branches": {"only": ["main"]},
        "matrix": {
            "exclude": [{"rvm": "2.7", "gemfile": "gemfiles/rails-7", "env": "DB=pg"}],
            "include": [{"rvm": "head", "gemfile": "gemfiles/rails-7"}],
            "allow_failures": [{"rvm": "head"}],
            "fast_finish": true,
        },
    }));

    let matrix = json!({
        "exclude": [{"rvm": "2.7", "gemfile": "gemfiles/rails-7", "env": "DB=pg"}],
        "include": [{"rvm": "head", "gemfile": "gemfiles/rails-7"}],
        "allow_failures": [{"rvm": "head"}],
    });
    let job = |rvm: &str, gemfile: &str, env: Option<&str>| {
        let mut config = json!({
            "language": "ruby",
            "script": "bundle exec rake",
            "rvm": rvm,
            "gemfile": gemfile,
        });
        if let Some(env) = env {
            config["env"] = json!(env);
        }
        config["matrix"] = matrix.clone();
        config["global_env"] = json!(["CI=true"]);
        config
    };

    assert_eq!(
        world.configs(&build_id),
        vec![
            job("2.7", "gemfiles/rails-6", Some("DB=pg")),
            job("3.2", "gemfiles/rails-6", Some("DB=pg")),
            job("3.2", "gemfiles/rails-7", Some("DB=pg")),
            job("head", "gemfiles/rails-7", None),
        ]
    );

    let jobs = world.runtime.jobs(&build_id).unwrap();
    let flags: Vec<bool> = jobs.iter().map(|job| job.allow_failure).collect();
    assert_eq!(flags, vec![false, false, false, true]);
    let numbers: Vec<&str> = jobs.iter().map(|job| job.number.as_str()).collect();
    assert_eq!(numbers, vec!["1.1", "1.2", "1.3", "1.4"]);
    assert!(jobs.iter().all(|job| job.commit_id == "abc123" && job.state == JobState::Created));
}

#[test]
fn multi_os_build_from_engine_config() {
    let config = EngineConfig::parse("multi_os = true").unwrap();
    let world = World::with_config(config);
    let build_id = world.build(json!({
        "language": "node_js",
        "os": ["linux", "osx"],
        "node_js": ["18", "20"],
    }));

    let pairs: Vec<(Value, Value)> = world
        .configs(&build_id)
        .into_iter()
        .map(|config| (config["os"].clone(), config["node_js"].clone()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (json!("linux"), json!("18")),
            (json!("linux"), json!("20")),
            (json!("osx"), json!("18")),
            (json!("osx"), json!("20")),
        ]
    );
}

#[test]
fn custom_language_row_from_engine_config() {
    let config = EngineConfig::parse(
        r#"
        [languages]
        rust = ["rust", "env"]
        "#,
    )
    .unwrap();
    let world = World::with_config(config);
    let build_id = world.build(json!({
        "language": "rust",
        "rust": ["stable", "beta", "nightly"],
        "rvm": ["3.2"],
    }));

    assert_eq!(
        world.configs(&build_id),
        vec![
            json!({"language": "rust", "rust": "stable"}),
            json!({"language": "rust", "rust": "beta"}),
            json!({"language": "rust", "rust": "nightly"}),
        ]
    );
}

#[test]
fn filtering_a_created_build() {
    let world = World::new();
    let build_id = world.build(json!({"rvm": ["2.7", "3.2"], "env": ["DB=sqlite3", "DB=pg"]}));
    let ids = world.job_ids(&build_id);

    let filter = json!({"env": "DB=pg"}).as_object().cloned().unwrap();
    let selected: Vec<JobId> = world
        .runtime
        .filter_matrix(&build_id, &filter)
        .unwrap()
        .into_iter()
        .map(|job: Job| job.id)
        .collect();

    assert_eq!(selected, vec![ids[1].clone(), ids[3].clone()]);
}
