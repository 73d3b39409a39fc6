// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job tagging hook, run when a job finishes.

use ci_core::Job;
use thiserror::Error;

/// Errors from tagging operations
#[derive(Debug, Error)]
pub enum TagError {
    #[error("tagging failed: {0}")]
    Failed(String),
}

/// Attaches search/index tags to a finished job.
pub trait Tagger: Clone + Send + Sync + 'static {
    fn add_tags(&self, job: &Job) -> Result<(), TagError>;
}

/// Tagger that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTagger;

impl Tagger for NoopTagger {
    fn add_tags(&self, job: &Job) -> Result<(), TagError> {
        tracing::trace!(job_id = %job.id, "no tagger configured");
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{TagError, Tagger};
    use ci_core::{Job, JobId};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeTaggerState {
        tagged: Vec<JobId>,
        fail: bool,
    }

    /// Fake tagger recording which jobs were tagged
    #[derive(Clone, Default)]
    pub struct FakeTagger {
        inner: Arc<Mutex<FakeTaggerState>>,
    }

    impl FakeTagger {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn tagged(&self) -> Vec<JobId> {
            self.inner.lock().tagged.clone()
        }

        pub fn set_failing(&self, fail: bool) {
            self.inner.lock().fail = fail;
        }
    }

    impl Tagger for FakeTagger {
        fn add_tags(&self, job: &Job) -> Result<(), TagError> {
            let mut inner = self.inner.lock();
            if inner.fail {
                return Err(TagError::Failed(format!("fake tagger refused {}", job.id)));
            }
            inner.tagged.push(job.id.clone());
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTagger;

#[cfg(test)]
#[path = "tagger_tests.rs"]
mod tests;
