//! Typed event channel decoupling the canvas editor from the chat preview.
//!
//! The module is organised around a synchronous fan-out [`EventChannel`] and
//! the [`EventSink`] subscriber trait, with ready-made sinks for tests
//! (`MemorySink`), pane mailboxes (`MailboxSink`), async consumers
//! (`ChannelSink`), and plain logging (`StdOutSink`).

pub mod bus;
pub mod event;
pub mod sink;

pub use bus::EventChannel;
pub use event::FlowEvent;
pub use sink::{ChannelSink, EventSink, MailboxSink, MemorySink, StdOutSink};
