// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! ```toml
//! multi_os = true
//! fallback_language = "ruby"
//!
//! [languages]
//! rust = ["os", "rust", "env"]
//! ```

use ci_core::LanguageTable;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid engine config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Expand build matrices on `os`
    pub multi_os: bool,
    /// Row for languages the table does not list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_language: Option<String>,
    /// Added or replaced rows of the language axis table
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub languages: IndexMap<String, Vec<String>>,
}

impl EngineConfig {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config = Self::parse(&text)?;
        tracing::debug!(path = %path.display(), multi_os = config.multi_os, "loaded engine config");
        Ok(config)
    }

    /// Load from `CI_CONFIG` if set (defaults otherwise), then apply
    /// `CI_MULTI_OS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match crate::env::config_path() {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        if let Some(multi_os) = crate::env::multi_os() {
            config.multi_os = multi_os;
        }
        Ok(config)
    }

    /// The built-in language table with this configuration's rows applied.
    pub fn language_table(&self) -> LanguageTable {
        let table = self
            .languages
            .iter()
            .fold(LanguageTable::default(), |table, (language, axes)| {
                table.with_row(language.as_str(), axes.iter().map(String::as_str))
            });
        match &self.fallback_language {
            Some(fallback) => table.with_fallback(fallback.as_str()),
            None => table,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
