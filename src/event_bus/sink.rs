use std::io::{self, Result as IoResult, Write};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use super::event::FlowEvent;

/// Abstraction over a subscriber that consumes full [`FlowEvent`] objects.
///
/// Handlers take `&self` because the channel fans out synchronously and a
/// handler may itself publish (sinks use interior mutability where they need
/// state). A handler must never block.
pub trait EventSink: Send + Sync {
    /// Handle a structured event. The sink decides how to route or format it.
    fn handle(&self, event: &FlowEvent) -> IoResult<()>;
}

/// Stdout sink rendering events through their `Display` form, one per line.
#[derive(Default)]
pub struct StdOutSink;

impl EventSink for StdOutSink {
    fn handle(&self, event: &FlowEvent) -> IoResult<()> {
        let mut handle = io::stdout();
        writeln!(handle, "{event}")?;
        handle.flush()
    }
}

/// In-memory sink for testing and snapshots.
#[derive(Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<FlowEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of all captured events.
    pub fn snapshot(&self) -> Vec<FlowEvent> {
        self.entries.lock().unwrap().clone()
    }

    /// Clear all captured events.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl EventSink for MemorySink {
    fn handle(&self, event: &FlowEvent) -> IoResult<()> {
        self.entries.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Channel-based sink for streaming to async consumers (e.g., a host UI task).
///
/// Events are forwarded to a tokio mpsc channel without blocking.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<FlowEvent>,
}

impl ChannelSink {
    /// Create a new channel sink.
    ///
    /// # Example
    /// ```no_run
    /// use tokio::sync::mpsc;
    /// use chatloom::event_bus::{ChannelSink, EventChannel};
    ///
    /// let channel = EventChannel::new();
    /// let (tx, mut rx) = mpsc::unbounded_channel();
    /// channel.add_sink(ChannelSink::new(tx));
    ///
    /// tokio::spawn(async move {
    ///     while let Some(event) = rx.recv().await {
    ///         println!("received: {event}");
    ///     }
    /// });
    /// ```
    pub fn new(tx: mpsc::UnboundedSender<FlowEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn handle(&self, event: &FlowEvent) -> IoResult<()> {
        self.tx
            .send(event.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "channel receiver dropped"))
    }
}

/// Pane mailbox sink backed by a flume channel.
///
/// Each pane (graph store, preview, external canvas) owns a mailbox and drains
/// it when control returns to the event loop, so a synchronous publish never
/// reenters pane state that is currently borrowed.
pub struct MailboxSink {
    tx: flume::Sender<FlowEvent>,
}

impl MailboxSink {
    /// Create an unbounded mailbox, returning the sink to register on the
    /// channel and the receiver for the pane to drain.
    pub fn unbounded() -> (Self, flume::Receiver<FlowEvent>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }
}

impl EventSink for MailboxSink {
    fn handle(&self, event: &FlowEvent) -> IoResult<()> {
        self.tx
            .send(event.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "mailbox receiver dropped"))
    }
}
