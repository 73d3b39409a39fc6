// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ci-core: build matrix expansion, job lifecycle and build status

pub mod macros;

pub mod aggregate;
pub mod build;
pub mod clock;
pub mod config;
pub mod effect;
pub mod event;
pub mod id;
pub mod job;
pub mod language;
pub mod machine;
pub mod matrix;
pub mod webhook;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use aggregate::{aggregate, AggregateError, BuildStatus, MatrixEntry};
pub use build::{Build, BuildPhase};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{BuildAttrs, BuildConfig};
pub use effect::Effect;
pub use event::{BuildPayload, Event, JobPayload};
pub use id::{BuildId, JobId};
#[cfg(any(test, feature = "test-support"))]
pub use job::JobBuilder;
pub use job::{Job, JobState};
pub use language::LanguageTable;
pub use machine::{FinishPayload, JobEvent, StartPayload, TransitionError};
pub use matrix::{filter_matrix, Expander, JobSpec};
pub use webhook::WebhookTargets;
