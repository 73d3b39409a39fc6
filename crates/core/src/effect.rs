// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Side effects requested by job transitions

use crate::event::Event;
use crate::id::{BuildId, JobId};
use serde::{Deserialize, Serialize};

/// Effects that the runtime executes, in order, after a transition has been
/// applied to the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Hand an event to the registered observers
    Notify { event: Event },

    /// Tag the job for search and indexing
    AddTags { job_id: JobId },

    /// Re-evaluate the owning build after a job event
    Propagate { build_id: BuildId, event: Event },
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Notify { .. } => "notify",
            Effect::AddTags { .. } => "add_tags",
            Effect::Propagate { .. } => "propagate",
        }
    }

    /// Key/value pairs describing the effect, for log lines.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Notify { event } => vec![("event", event.name().to_string())],
            Effect::AddTags { job_id } => vec![("job_id", job_id.to_string())],
            Effect::Propagate { build_id, event } => {
                vec![("build_id", build_id.to_string()), ("event", event.name().to_string())]
            }
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
