// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ci_core::aggregate::AggregateError;
use ci_core::machine::TransitionError;
use ci_core::{BuildId, JobId};
use thiserror::Error;

/// Errors returned by [`crate::Runtime`] operations
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("job not found: {0}")]
    JobNotFound(JobId),
    #[error("build not found: {0}")]
    BuildNotFound(BuildId),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}
