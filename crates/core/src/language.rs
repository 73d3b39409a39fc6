// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-language matrix axes.
//!
//! Each language lists the configuration keys that expand its build matrix,
//! in expansion order. `os` leads every row so the operating system varies
//! slowest when multi-OS expansion is on.

use crate::config::DEFAULT_LANGUAGE;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key that only acts as an axis when multi-OS expansion is enabled.
pub const OS_AXIS: &str = "os";

const BUILTIN: &[(&str, &[&str])] = &[
    ("ruby", &["os", "rvm", "gemfile", "jdk", "env"]),
    ("objective-c", &["os", "rvm", "gemfile", "xcode_sdk", "xcode_scheme", "env"]),
    ("python", &["os", "python", "env"]),
    ("scala", &["os", "scala", "jdk", "env"]),
    ("java", &["os", "jdk", "env"]),
    ("jvm", &["os", "jdk", "env"]),
    ("groovy", &["os", "jdk", "env"]),
    ("clojure", &["os", "jdk", "env"]),
    ("erlang", &["os", "otp_release", "env"]),
    ("php", &["os", "php", "env"]),
    ("node_js", &["os", "node_js", "env"]),
    ("perl", &["os", "perl", "env"]),
    ("c", &["os", "compiler", "env"]),
    ("cpp", &["os", "compiler", "env"]),
    ("haskell", &["os", "ghc", "env"]),
    ("go", &["os", "go", "env"]),
];

/// Declarative language → axis-key table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageTable {
    rows: IndexMap<String, Vec<String>>,
    /// Row used for languages without one of their own
    fallback: String,
}

impl LanguageTable {
    /// An empty table falling back to `fallback`.
    pub fn empty(fallback: impl Into<String>) -> Self {
        Self { rows: IndexMap::new(), fallback: fallback.into() }
    }

    /// Add or replace the row for `language`.
    pub fn with_row<I, S>(mut self, language: impl Into<String>, axes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.insert(language.into(), axes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Axis keys for `language`, in expansion order.
    pub fn axes(&self, language: &str) -> &[String] {
        self.rows
            .get(language)
            .or_else(|| self.rows.get(&self.fallback))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `key` is an axis of any language.
    ///
    /// Such keys are dropped from a job unless they are axes of its own
    /// language.
    pub fn is_axis_key(&self, key: &str) -> bool {
        self.rows.values().any(|axes| axes.iter().any(|a| a == key))
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        BUILTIN
            .iter()
            .fold(Self::empty(DEFAULT_LANGUAGE), |table, (language, axes)| {
                table.with_row(*language, axes.iter().copied())
            })
    }
}

#[cfg(test)]
#[path = "language_tests.rs"]
mod tests;
