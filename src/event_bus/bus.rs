use std::sync::{Arc, Mutex};

use super::event::FlowEvent;
use super::sink::EventSink;

/// Typed, synchronous publish/subscribe channel decoupling the graph editor
/// from the chat preview.
///
/// `EventChannel` is a pure fan-out mechanism: it does not transform, merge,
/// queue, or deduplicate payloads. A publish with no subscribers is a silent
/// no-op; a failing subscriber is logged and never retried. Same-kind events
/// from a single publisher arrive at every sink in publish order.
///
/// The handle is cheap to clone; all clones share the same subscriber list,
/// so producers can hold their own handle the way canvas and preview each do.
///
/// # Examples
///
/// ```
/// use chatloom::event_bus::{EventChannel, FlowEvent, MemorySink};
/// use chatloom::types::MessageId;
///
/// let channel = EventChannel::new();
/// let captured = MemorySink::new();
/// channel.add_sink(captured.clone());
///
/// channel.publish(FlowEvent::delete_one(MessageId::from("m1")));
/// assert_eq!(captured.snapshot().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct EventChannel {
    sinks: Arc<Mutex<Vec<Arc<dyn EventSink>>>>,
}

impl EventChannel {
    /// Create a channel with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a channel with a single subscriber.
    #[must_use]
    pub fn with_sink<T>(sink: T) -> Self
    where
        T: EventSink + 'static,
    {
        let channel = Self::new();
        channel.add_sink(sink);
        channel
    }

    /// Register a subscriber. Subscribers added mid-stream see only events
    /// published after registration.
    pub fn add_sink<T: EventSink + 'static>(&self, sink: T) {
        self.sinks.lock().unwrap().push(Arc::new(sink));
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.sinks.lock().unwrap().len()
    }

    /// Fan an event out to every subscriber, synchronously.
    ///
    /// The sink list is snapshotted before dispatch, so a handler may publish
    /// further events without deadlocking the channel. Handler failures are
    /// logged at warn level and do not stop delivery to the remaining sinks.
    pub fn publish(&self, event: FlowEvent) {
        let sinks: Vec<Arc<dyn EventSink>> = self.sinks.lock().unwrap().clone();
        if sinks.is_empty() {
            return;
        }
        for sink in &sinks {
            if let Err(e) = sink.handle(&event) {
                tracing::warn!(kind = event.kind(), error = %e, "event sink failed");
            }
        }
    }
}
