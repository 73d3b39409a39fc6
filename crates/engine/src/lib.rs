// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ci-engine: owns live builds, applies job transitions and announces build
//! status changes

pub mod config;
pub mod env;
mod error;
mod runtime;

pub use config::{ConfigError, EngineConfig};
pub use error::RuntimeError;
pub use runtime::{Runtime, RuntimeDeps};
