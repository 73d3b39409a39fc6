// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ci-adapters: outbound seams of the build engine

pub mod sink;
pub mod tagger;

pub use sink::{ChannelSink, EventBus, EventSink, SinkError};
pub use tagger::{NoopTagger, TagError, Tagger};

#[cfg(any(test, feature = "test-support"))]
pub use sink::FakeEventSink;
#[cfg(any(test, feature = "test-support"))]
pub use tagger::FakeTagger;
