// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsed build configuration and the attributes shared by a build's jobs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Language assumed when the configuration names none.
pub const DEFAULT_LANGUAGE: &str = "ruby";

/// Sections of `matrix` that are carried verbatim onto every job.
pub const MATRIX_SECTIONS: [&str; 3] = ["exclude", "include", "allow_failures"];

/// An already-parsed build configuration.
///
/// Key order is preserved so that non-axis keys land on jobs in the order the
/// configuration lists them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildConfig(Map<String, Value>);

impl BuildConfig {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Build from any JSON value. Anything other than an object is an empty
    /// configuration.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The configured language, `"ruby"` when absent.
    ///
    /// A list takes its first element.
    pub fn language(&self) -> &str {
        let value = match self.0.get("language") {
            Some(Value::Array(items)) => items.first(),
            other => other,
        };
        value.and_then(Value::as_str).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_LANGUAGE)
    }

    /// The `env` value that acts as a matrix axis.
    ///
    /// `env: {global: [...], matrix: [...]}` splits into an axis (`matrix`)
    /// and per-job globals; any other `env` value is the axis itself.
    pub fn env_axis(&self) -> Option<&Value> {
        let env = self.0.get("env")?;
        match env {
            Value::Object(map) if is_env_split(map) => map.get("matrix"),
            _ => Some(env),
        }
    }

    /// `env.global` as a list, if present and non-empty.
    pub fn global_env(&self) -> Option<Vec<Value>> {
        let Some(Value::Object(map)) = self.0.get("env") else {
            return None;
        };
        if !is_env_split(map) {
            return None;
        }
        let values = match map.get("global")? {
            Value::Array(items) => items.clone(),
            Value::Null => Vec::new(),
            other => vec![other.clone()],
        };
        (!values.is_empty()).then_some(values)
    }

    pub fn matrix(&self) -> MatrixSettings<'_> {
        MatrixSettings { section: self.0.get("matrix").and_then(Value::as_object) }
    }

    pub fn fast_finish(&self) -> bool {
        self.matrix().fast_finish()
    }
}

impl From<Map<String, Value>> for BuildConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn is_env_split(map: &Map<String, Value>) -> bool {
    map.contains_key("global") || map.contains_key("matrix")
}

/// Read-only view of the `matrix` section of a configuration.
#[derive(Debug, Clone, Copy)]
pub struct MatrixSettings<'a> {
    section: Option<&'a Map<String, Value>>,
}

impl<'a> MatrixSettings<'a> {
    pub fn exclude(&self) -> Vec<&'a Map<String, Value>> {
        self.rules("exclude")
    }

    pub fn include(&self) -> Vec<&'a Map<String, Value>> {
        self.rules("include")
    }

    pub fn allow_failures(&self) -> Vec<&'a Map<String, Value>> {
        self.rules("allow_failures")
    }

    pub fn fast_finish(&self) -> bool {
        self.section.and_then(|m| m.get("fast_finish")).and_then(Value::as_bool).unwrap_or(false)
    }

    /// The `exclude`/`include`/`allow_failures` sections exactly as given,
    /// or `None` when the configuration has none of them.
    pub fn carried(&self) -> Option<Map<String, Value>> {
        let section = self.section?;
        let carried: Map<String, Value> = MATRIX_SECTIONS
            .iter()
            .filter_map(|key| section.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect();
        (!carried.is_empty()).then_some(carried)
    }

    /// Rule maps under `key`. Non-mapping and empty entries are skipped.
    fn rules(&self, key: &str) -> Vec<&'a Map<String, Value>> {
        let entries = match self.section.and_then(|m| m.get(key)) {
            Some(Value::Array(items)) => items.iter().collect::<Vec<_>>(),
            Some(single @ Value::Object(_)) => vec![single],
            _ => return Vec::new(),
        };
        entries
            .into_iter()
            .filter_map(|entry| match entry.as_object() {
                Some(rule) if !rule.is_empty() => Some(rule),
                _ => {
                    tracing::debug!(section = key, rule = %entry, "skipping malformed matrix rule");
                    None
                }
            })
            .collect()
    }
}

/// Build attributes copied unchanged onto every job of the build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildAttrs {
    /// Build number; job numbers are `"<number>.<index>"`
    pub number: String,
    pub commit_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl BuildAttrs {
    pub fn new(number: impl Into<String>, commit_id: impl Into<String>) -> Self {
        Self { number: number.into(), commit_id: commit_id.into(), ..Self::default() }
    }

    crate::setters! {
        into {
            number: String,
            commit_id: String,
        }
        option {
            repository_id: String,
            branch: String,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
