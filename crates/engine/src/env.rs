// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use std::path::PathBuf;

/// Engine configuration file (`CI_CONFIG`)
pub fn config_path() -> Option<PathBuf> {
    std::env::var("CI_CONFIG").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Multi-OS override (`CI_MULTI_OS`): `1`/`true` enable, `0`/`false` disable.
/// Unset or unrecognized values leave the configured setting alone.
pub fn multi_os() -> Option<bool> {
    let value = std::env::var("CI_MULTI_OS").ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        other => {
            tracing::warn!(value = other, "ignoring unrecognized CI_MULTI_OS");
            None
        }
    }
}
