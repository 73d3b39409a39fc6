// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build entity and build-level announcements.

use crate::aggregate::BuildStatus;
use crate::config::{BuildAttrs, BuildConfig};
use crate::event::{BuildPayload, Event};
use crate::id::{BuildId, JobId};
use serde::{Deserialize, Serialize};

/// A build and its matrix, as job ids in number order.
///
/// State and duration are never stored here; see [`crate::aggregate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub id: BuildId,
    pub config: BuildConfig,
    pub attrs: BuildAttrs,
    pub jobs: Vec<JobId>,
}

impl Build {
    pub fn new(id: BuildId, config: BuildConfig, attrs: BuildAttrs) -> Self {
        Self { id, config, attrs, jobs: Vec::new() }
    }

    pub fn number(&self) -> &str {
        &self.attrs.number
    }

    pub fn fast_finish(&self) -> bool {
        self.config.fast_finish()
    }
}

/// Last build lifecycle stage announced to observers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPhase {
    #[default]
    Created,
    Started,
    Finished,
}

crate::simple_display! {
    BuildPhase {
        Created => "created",
        Started => "started",
        Finished => "finished",
    }
}

impl BuildPhase {
    /// Phase a build with `status` is in, given it was last in `self`.
    ///
    /// A build that has been announced keeps its phase until the status
    /// says otherwise, so a build is never announced as created again.
    pub fn next(self, status: &BuildStatus) -> BuildPhase {
        if status.finished {
            BuildPhase::Finished
        } else if status.started {
            BuildPhase::Started
        } else {
            self
        }
    }

    /// Move to the phase `status` implies and return the build events that
    /// announce the move.
    ///
    /// Finishing without having started announces both. A finished build
    /// whose status falls back to unfinished (a job restart) is announced as
    /// started again.
    pub fn advance(&mut self, build: &Build, status: &BuildStatus) -> Vec<Event> {
        let next = self.next(status);
        let started = || Event::BuildStarted { build: BuildPayload::new(build, status) };
        let finished = || Event::BuildFinished { build: BuildPayload::new(build, status) };

        let events = match (*self, next) {
            (BuildPhase::Created, BuildPhase::Started) => vec![started()],
            (BuildPhase::Created, BuildPhase::Finished) => vec![started(), finished()],
            (BuildPhase::Started, BuildPhase::Finished) => vec![finished()],
            (BuildPhase::Finished, BuildPhase::Started) => vec![started()],
            _ => Vec::new(),
        };
        if !events.is_empty() {
            tracing::debug!(build_id = %build.id, from = %self, to = %next, "build phase changed");
        }
        *self = next;
        events
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
