// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{BuildConfig, Job, JobId, JobState};
use serde_json::Value;

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core types.
pub mod strategies {
    use crate::job::JobState;
    use proptest::prelude::*;
    use serde_json::{Map, Value};

    const KNOWN: [&str; 8] =
        ["created", "queued", "started", "passed", "failed", "errored", "canceled", "finished"];

    pub fn arb_job_state() -> impl Strategy<Value = JobState> {
        prop_oneof![
            Just(JobState::Created),
            Just(JobState::Queued),
            Just(JobState::Started),
            Just(JobState::Passed),
            Just(JobState::Failed),
            Just(JobState::Errored),
            Just(JobState::Canceled),
            Just(JobState::Finished),
            "[a-z_]{1,12}"
                .prop_filter("known state name", |name| !KNOWN.contains(&name.as_str()))
                .prop_map(JobState::Other),
        ]
    }

    /// A ruby configuration with 0 to 3 values on each of `rvm`, `gemfile`
    /// and `env`. Values are unique per axis.
    pub fn arb_ruby_config() -> impl Strategy<Value = Map<String, Value>> {
        let axis = |prefix: &'static str| {
            proptest::collection::btree_set(0u8..20, 0..=3).prop_map(move |values| {
                values.into_iter().map(|v| Value::String(format!("{prefix}{v}"))).collect::<Vec<_>>()
            })
        };
        (axis("2."), axis("gemfiles/g"), axis("FOO=")).prop_map(|(rvm, gemfile, env)| {
            let mut config = Map::new();
            config.insert("language".into(), Value::String("ruby".into()));
            for (key, values) in [("rvm", rvm), ("gemfile", gemfile), ("env", env)] {
                if !values.is_empty() {
                    config.insert(key.into(), Value::Array(values));
                }
            }
            config
        })
    }
}

// ── Builders ────────────────────────────────────────────────────────────────

/// Parse a JSON literal into a build configuration.
pub fn build_config(value: Value) -> BuildConfig {
    BuildConfig::from_value(value)
}

/// A job with a fresh id in `state`.
pub fn job_in(state: &str, allow_failure: bool) -> Job {
    Job::builder()
        .id(JobId::new())
        .state(JobState::from_name(state))
        .allow_failure(allow_failure)
        .build()
}

/// A matrix of jobs numbered `1.1`, `1.2`, ... from `(state, allow_failure)`
/// pairs.
pub fn matrix_of(jobs: &[(&str, bool)]) -> Vec<Job> {
    jobs.iter()
        .enumerate()
        .map(|(i, (state, allow_failure))| {
            Job::builder()
                .id(format!("job-{}", i + 1))
                .number(format!("1.{}", i + 1))
                .state(JobState::from_name(state))
                .allow_failure(*allow_failure)
                .build()
        })
        .collect()
}
