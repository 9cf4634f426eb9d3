//! # Chatloom: Graph-to-Sequence Synchronization Engine
//!
//! Chatloom keeps two independently-rendered views of a branching
//! conversational flow consistent without a shared render tree: a node graph
//! on a canvas, and a linear chat transcript in a preview pane. The engine
//! derives a deterministic, cycle-safe message order from the mutable graph,
//! propagates it through a typed event channel, and supports an isolated
//! test mode that replays a transcript prefix from any chosen step.
//!
//! ## Core Concepts
//!
//! - **Graph Store**: the authoritative node/edge/component state; the only
//!   writer of topology
//! - **Order Resolver**: a pure function flattening the graph into a linear
//!   order plus an orphan set, rerun on every mutation
//! - **Event Channel**: synchronous, typed fan-out decoupling the panes
//! - **Conversation Projector**: the preview-side transcript, rebuilt (not
//!   replaced) on every sync so entity identity survives reorders
//! - **Test Mode**: an ephemeral, frozen replay of a transcript prefix
//!
//! ## Quick Start
//!
//! ### Driving the whole engine
//!
//! ```
//! use chatloom::app::FlowApp;
//! use chatloom::types::UiToolType;
//! use serde_json::json;
//!
//! let mut app = FlowApp::default();
//!
//! // Author a linear flow: question -> message
//! let (n1, m1) = app.add_step(UiToolType::Question, json!({"q": "Ready?"})).unwrap();
//! let (n2, m2) = app.add_step(UiToolType::Message, json!({"text": "Let's go"})).unwrap();
//! app.connect_steps(&n1, &n2).unwrap();
//!
//! // The preview mirrors the resolved order
//! let order: Vec<_> = app.projector().order().cloned().collect();
//! assert_eq!(order, vec![m1.clone(), m2]);
//!
//! // Replay a prefix in test mode; the main transcript stays untouched
//! assert!(app.enter_test(m1));
//! assert_eq!(app.test_mode().transcript().len(), 1);
//! app.exit_test();
//! ```
//!
//! ### Resolving order by hand
//!
//! ```
//! use chatloom::event_bus::EventChannel;
//! use chatloom::graph::{resolve, GraphStore};
//! use chatloom::types::{EdgeId, MessageId, NodeId};
//!
//! let mut store = GraphStore::new(EventChannel::new());
//! for n in ["a", "b"] {
//!     store.add_node(NodeId::from(n)).unwrap();
//! }
//! store.connect(EdgeId::from("e"), &NodeId::from("a"), &NodeId::from("b")).unwrap();
//!
//! // A cycle back to "a" neither loops nor duplicates
//! store.connect(EdgeId::from("back"), &NodeId::from("b"), &NodeId::from("a")).unwrap();
//! let resolved = resolve(&store);
//! assert!(resolved.order.is_empty()); // no messages materialized yet
//! ```
//!
//! ### Listening on the channel
//!
//! ```
//! use chatloom::event_bus::{EventChannel, FlowEvent, MemorySink};
//! use chatloom::types::MessageId;
//!
//! let channel = EventChannel::new();
//! let captured = MemorySink::new();
//! channel.add_sink(captured.clone());
//!
//! channel.publish(FlowEvent::ScrollToMessage { message_id: MessageId::from("m7") });
//! assert_eq!(captured.snapshot()[0].kind(), "scrollToMessage");
//! ```
//!
//! ## Module Guide
//!
//! - [`types`] - Identifier newtypes and discriminants
//! - [`graph`] - Authoritative store and the order resolver
//! - [`event_bus`] - Typed event vocabulary, channel, and sinks
//! - [`projector`] - Preview transcript projection and rendering rules
//! - [`testmode`] - Test-mode session controller
//! - [`snapshot`] - Persisted shapes and the storage boundary
//! - [`tasks`] - Cancellable scheduled tasks (animation, auto-save)
//! - [`app`] - Fully wired engine facade
//! - [`config`] - Environment-resolved tunables
//! - [`telemetry`] - Tracing setup

pub mod app;
pub mod config;
pub mod event_bus;
pub mod graph;
pub mod projector;
pub mod snapshot;
pub mod tasks;
pub mod telemetry;
pub mod testmode;
pub mod types;
