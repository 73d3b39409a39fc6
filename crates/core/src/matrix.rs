// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build matrix expansion.
//!
//! Turns a [`BuildConfig`] into the ordered list of [`JobSpec`]s a build
//! runs: the cartesian product of the language's axes, minus exclusions,
//! plus inclusions, with allow-failure flags and sequential job numbers.

use crate::config::{BuildAttrs, BuildConfig};
use crate::job::Job;
use crate::language::{LanguageTable, OS_AXIS};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Top-level keys that describe the build rather than a job.
const STRUCTURAL_KEYS: [&str; 4] = ["matrix", "notifications", "branches", "env"];

/// Job key holding `env.global`.
pub const GLOBAL_ENV_KEY: &str = "global_env";

/// One planned job of a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    /// `"<build number>.<position>"`, 1-based
    pub number: String,
    /// Resolved job configuration
    pub config: Map<String, Value>,
    pub allow_failure: bool,
    pub commit_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// A matrix dimension: a configuration key and its values in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis<'a> {
    pub key: &'a str,
    pub values: Vec<&'a Value>,
}

/// Expands build configurations against a language table.
#[derive(Debug, Clone, Copy)]
pub struct Expander<'t> {
    table: &'t LanguageTable,
    multi_os: bool,
}

impl<'t> Expander<'t> {
    pub fn new(table: &'t LanguageTable, multi_os: bool) -> Self {
        Self { table, multi_os }
    }

    /// The axes `config` expands on, in table order. Keys that are absent or
    /// have no values contribute nothing.
    pub fn axes<'c>(&self, config: &'c BuildConfig) -> Vec<Axis<'c>>
    where
        't: 'c,
    {
        self.table
            .axes(config.language())
            .iter()
            .filter(|key| self.multi_os || key.as_str() != OS_AXIS)
            .filter_map(|key| {
                let raw = if key == "env" { config.env_axis() } else { config.get(key) };
                let values = as_list(raw?);
                (!values.is_empty()).then_some(Axis { key: key.as_str(), values })
            })
            .collect()
    }

    /// Plan the jobs of a build.
    ///
    /// Always returns at least one job: when exclusions remove every
    /// combination and nothing is included, the build runs the base
    /// configuration alone.
    pub fn expand(&self, config: &BuildConfig, attrs: &BuildAttrs) -> Vec<JobSpec> {
        let language = config.language();
        let axes = self.axes(config);
        let base = self.base_config(config);
        let global_env = config.global_env();
        let matrix = config.matrix();
        let carried = matrix.carried();
        let exclude = matrix.exclude();
        let allow_failures = matrix.allow_failures();

        let finish = |mut job: Map<String, Value>| {
            if let Some(carried) = &carried {
                job.insert("matrix".to_string(), Value::Object(carried.clone()));
            }
            if let Some(env) = &global_env {
                job.insert(GLOBAL_ENV_KEY.to_string(), Value::Array(env.clone()));
            }
            job
        };

        let expanded = cartesian(&axes)
            .into_iter()
            .filter(|combination| !exclude.iter().any(|rule| excludes(rule, combination)))
            .map(|combination| {
                let mut job = base.clone();
                for (key, value) in combination {
                    job.insert(key.to_string(), value.clone());
                }
                finish(job)
            });

        let included = matrix.include().into_iter().map(|rule| {
            let mut job = base.clone();
            for (key, value) in rule {
                job.insert(key.clone(), value.clone());
            }
            finish(job)
        });

        let mut jobs: Vec<Map<String, Value>> = expanded.chain(included).collect();
        if jobs.is_empty() {
            tracing::debug!(language, build = %attrs.number, "matrix fully excluded, using base job");
            jobs.push(finish(base.clone()));
        }

        let specs: Vec<JobSpec> = jobs
            .into_iter()
            .enumerate()
            .map(|(index, job)| JobSpec {
                number: format!("{}.{}", attrs.number, index + 1),
                allow_failure: allow_failures.iter().any(|rule| allows_failure(rule, &job)),
                config: job,
                commit_id: attrs.commit_id.clone(),
                repository_id: attrs.repository_id.clone(),
                branch: attrs.branch.clone(),
            })
            .collect();

        tracing::debug!(
            language,
            axes = axes.len(),
            jobs = specs.len(),
            build = %attrs.number,
            "expanded build matrix"
        );
        specs
    }

    /// `language` followed by every key that is neither structural nor an
    /// axis of any language, in configuration order.
    fn base_config(&self, config: &BuildConfig) -> Map<String, Value> {
        let mut base = Map::new();
        base.insert("language".to_string(), Value::String(config.language().to_string()));
        for (key, value) in config.as_map() {
            if key == "language" || STRUCTURAL_KEYS.contains(&key.as_str()) || self.table.is_axis_key(key) {
                continue;
            }
            base.insert(key.clone(), value.clone());
        }
        base
    }
}

/// Jobs whose configuration agrees with `filter` on every key the job has.
///
/// Filter keys missing from a job's configuration are ignored.
pub fn filter_matrix<'a>(jobs: &'a [Job], filter: &Map<String, Value>) -> Vec<&'a Job> {
    jobs.iter()
        .filter(|job| {
            filter.iter().all(|(key, wanted)| {
                job.config.get(key).map_or(true, |actual| values_match(actual, wanted))
            })
        })
        .collect()
}

/// Compare two configuration values as text, so `2.7` matches `"2.7"`.
pub fn values_match(a: &Value, b: &Value) -> bool {
    scalar_text(a) == scalar_text(b)
}

fn scalar_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().filter(|v| !v.is_null()).collect(),
        other => vec![other],
    }
}

/// Odometer-ordered cartesian product: the last axis varies fastest.
fn cartesian<'a>(axes: &[Axis<'a>]) -> Vec<Vec<(&'a str, &'a Value)>> {
    axes.iter().fold(vec![Vec::new()], |combinations, axis| {
        combinations
            .into_iter()
            .flat_map(|prefix| {
                axis.values.iter().map(move |value| {
                    let mut combination = prefix.clone();
                    combination.push((axis.key, *value));
                    combination
                })
            })
            .collect()
    })
}

/// An exclusion rule matches only when it names exactly the combination's
/// axes with equal values.
fn excludes(rule: &Map<String, Value>, combination: &[(&str, &Value)]) -> bool {
    rule.len() == combination.len()
        && combination
            .iter()
            .all(|(key, value)| rule.get(*key).is_some_and(|wanted| values_match(value, wanted)))
}

fn allows_failure(rule: &Map<String, Value>, job: &Map<String, Value>) -> bool {
    rule.iter().all(|(key, wanted)| {
        key != GLOBAL_ENV_KEY
            && key != "matrix"
            && job.get(key).is_some_and(|actual| values_match(actual, wanted))
    })
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;
