// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event sinks: where lifecycle events leave the engine.

use ci_core::Event;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from event delivery
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("event channel closed")]
    Closed,
    #[error("delivery failed: {0}")]
    Failed(String),
}

/// Receives lifecycle events.
///
/// Called while the engine processes a transition, so implementations must
/// not block; hand the event off and return.
pub trait EventSink: Send + Sync + 'static {
    fn publish(&self, event: &Event) -> Result<(), SinkError>;
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn publish(&self, event: &Event) -> Result<(), SinkError> {
        (**self).publish(event)
    }
}

/// Sink that forwards events to an async consumer over an unbounded channel.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
        Self { tx }
    }

    /// A sink and the receiving end for the dispatcher.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelSink {
    fn publish(&self, event: &Event) -> Result<(), SinkError> {
        self.tx.send(event.clone()).map_err(|_| SinkError::Closed)
    }
}

/// Fans each event out to every registered sink.
///
/// A failing sink is logged and skipped; the remaining sinks still receive
/// the event.
#[derive(Clone, Default)]
pub struct EventBus {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, sink: impl EventSink) {
        self.sinks.push(Arc::new(sink));
    }

    pub fn with_sink(mut self, sink: impl EventSink) -> Self {
        self.register(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Deliver to every sink. Returns how many accepted the event.
    pub fn broadcast(&self, event: &Event) -> usize {
        let mut delivered = 0;
        for (index, sink) in self.sinks.iter().enumerate() {
            match sink.publish(event) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    sink = index,
                    event = event.name(),
                    error = %e,
                    "event delivery failed"
                ),
            }
        }
        delivered
    }
}

impl EventSink for EventBus {
    fn publish(&self, event: &Event) -> Result<(), SinkError> {
        self.broadcast(event);
        Ok(())
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").field("sinks", &self.sinks.len()).finish()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{EventSink, SinkError};
    use ci_core::Event;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeSinkState {
        events: Vec<Event>,
        fail: bool,
    }

    /// Fake sink recording every event for assertions
    #[derive(Clone, Default)]
    pub struct FakeEventSink {
        inner: Arc<Mutex<FakeSinkState>>,
    }

    impl FakeEventSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Get all recorded events
        pub fn events(&self) -> Vec<Event> {
            self.inner.lock().events.clone()
        }

        /// Names of the recorded events, in delivery order
        pub fn names(&self) -> Vec<&'static str> {
            self.inner.lock().events.iter().map(Event::name).collect()
        }

        /// Recorded events with the given name
        pub fn named(&self, name: &str) -> Vec<Event> {
            self.inner.lock().events.iter().filter(|e| e.name() == name).cloned().collect()
        }

        pub fn clear(&self) {
            self.inner.lock().events.clear();
        }

        /// Make subsequent deliveries fail (events are not recorded)
        pub fn set_failing(&self, fail: bool) {
            self.inner.lock().fail = fail;
        }
    }

    impl EventSink for FakeEventSink {
        fn publish(&self, event: &Event) -> Result<(), SinkError> {
            let mut inner = self.inner.lock();
            if inner.fail {
                return Err(SinkError::Failed("fake sink set to fail".to_string()));
            }
            inner.events.push(event.clone());
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeEventSink;

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
