//! End-to-end wiring of the synchronization engine.
//!
//! [`FlowApp`] owns one instance of every core component (event channel,
//! graph store, conversation projector, test-mode controller) connected the
//! way a host UI would connect them: each pane gets its own mailbox on the
//! channel and drains it cooperatively via [`pump`](FlowApp::pump). The app
//! is also where snapshots are captured and restored, and where the
//! auto-saver is started.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::config::FlowConfig;
use crate::event_bus::{EventChannel, FlowEvent, MailboxSink};
use crate::graph::{Component, GraphError, GraphStore};
use crate::projector::{ConversationProjector, MessageBody, TranscriptEntry};
use crate::snapshot::{FlowSnapshot, SnapshotError, SnapshotStore};
use crate::tasks::{self, ScheduledTask};
use crate::testmode::TestModeController;
use crate::types::{ComponentId, EdgeId, MessageId, NodeId, UiToolType};

/// A fully wired synchronization engine.
///
/// Execution is single-threaded and cooperative: mutations publish events,
/// and [`pump`](Self::pump) routes queued events to the pane that consumes
/// them until the system is quiescent. Events addressed to the external
/// canvas (selection, highlight, test-mode boundary crossings) accumulate in
/// [`canvas_events`](Self::canvas_events) for the host to drain.
///
/// # Examples
///
/// ```
/// use chatloom::app::FlowApp;
/// use chatloom::types::UiToolType;
/// use serde_json::json;
///
/// let mut app = FlowApp::default();
/// let (n1, m1) = app.add_step(UiToolType::Question, json!({"q": "Tea or coffee?"})).unwrap();
/// let (n2, m2) = app.add_step(UiToolType::Message, json!({"text": "Great choice."})).unwrap();
/// app.connect_steps(&n1, &n2).unwrap();
///
/// let order: Vec<_> = app.projector().order().cloned().collect();
/// assert_eq!(order, vec![m1, m2]);
/// ```
pub struct FlowApp {
    channel: EventChannel,
    store: GraphStore,
    projector: ConversationProjector,
    test: TestModeController,
    store_rx: flume::Receiver<FlowEvent>,
    preview_rx: flume::Receiver<FlowEvent>,
    canvas_rx: flume::Receiver<FlowEvent>,
    config: FlowConfig,
}

impl Default for FlowApp {
    fn default() -> Self {
        Self::new(FlowConfig::default())
    }
}

struct Wiring {
    channel: EventChannel,
    store_rx: flume::Receiver<FlowEvent>,
    preview_rx: flume::Receiver<FlowEvent>,
    canvas_rx: flume::Receiver<FlowEvent>,
}

fn wire_channel() -> Wiring {
    let channel = EventChannel::new();
    let (store_sink, store_rx) = MailboxSink::unbounded();
    let (preview_sink, preview_rx) = MailboxSink::unbounded();
    let (canvas_sink, canvas_rx) = MailboxSink::unbounded();
    channel.add_sink(store_sink);
    channel.add_sink(preview_sink);
    channel.add_sink(canvas_sink);
    Wiring {
        channel,
        store_rx,
        preview_rx,
        canvas_rx,
    }
}

impl FlowApp {
    /// Creates an empty, fully wired engine.
    #[must_use]
    pub fn new(config: FlowConfig) -> Self {
        let wiring = wire_channel();
        Self {
            store: GraphStore::new(wiring.channel.clone()),
            projector: ConversationProjector::new(wiring.channel.clone()),
            test: TestModeController::new(wiring.channel.clone()),
            channel: wiring.channel,
            store_rx: wiring.store_rx,
            preview_rx: wiring.preview_rx,
            canvas_rx: wiring.canvas_rx,
            config,
        }
    }

    /// Reconstructs an engine from a persisted snapshot, then publishes one
    /// resolution pass so every pane starts from the same order.
    #[must_use]
    pub fn from_snapshot(snapshot: FlowSnapshot, config: FlowConfig) -> Self {
        let wiring = wire_channel();
        let (store, projector) = snapshot.restore(&wiring.channel);
        let mut app = Self {
            store,
            projector,
            test: TestModeController::new(wiring.channel.clone()),
            channel: wiring.channel,
            store_rx: wiring.store_rx,
            preview_rx: wiring.preview_rx,
            canvas_rx: wiring.canvas_rx,
            config,
        };
        app.store.sync();
        app.pump();
        app
    }

    // ------------------------------------------------------------------
    // Cooperative event loop
    // ------------------------------------------------------------------

    /// Drains pane mailboxes until the system is quiescent.
    ///
    /// Events may cascade (a `deleteNode` produces a `deleteMessage` and a
    /// fresh sync), so draining loops until both mailboxes stay empty.
    /// Termination is guaranteed because deletions are idempotent and sync
    /// application publishes nothing. Cross-pane deletion is deliberately
    /// not transactional: each pane applies the same delete independently,
    /// and a failure in one is never rolled back in the other.
    pub fn pump(&mut self) {
        loop {
            let mut progressed = false;
            while let Ok(event) = self.store_rx.try_recv() {
                self.store.apply(&event);
                progressed = true;
            }
            while let Ok(event) = self.preview_rx.try_recv() {
                self.projector.apply(&event);
                progressed = true;
            }
            if !progressed {
                break;
            }
        }
    }

    /// The mailbox of events addressed to the external canvas pane.
    #[must_use]
    pub fn canvas_events(&self) -> &flume::Receiver<FlowEvent> {
        &self.canvas_rx
    }

    // ------------------------------------------------------------------
    // Authoring conveniences (canvas-driven mutations + pump)
    // ------------------------------------------------------------------

    /// Adds a node, attaches a component, and materializes its message in
    /// one go. Returns the minted node and message ids.
    pub fn add_step(
        &mut self,
        tool: UiToolType,
        content: Value,
    ) -> Result<(NodeId, MessageId), GraphError> {
        let node_id = NodeId::generate();
        self.store.add_node(node_id.clone())?;
        self.store.attach_component(
            &node_id,
            Component {
                id: ComponentId::generate(),
                tool,
                content,
            },
        )?;
        let message_id = MessageId::generate();
        self.store
            .materialize_message(&node_id, message_id.clone(), false)?;
        self.pump();
        Ok((node_id, message_id))
    }

    /// Connects two steps with a fresh edge.
    pub fn connect_steps(&mut self, source: &NodeId, target: &NodeId) -> Result<EdgeId, GraphError> {
        let edge_id = EdgeId::generate();
        self.store.connect(edge_id.clone(), source, target)?;
        self.pump();
        Ok(edge_id)
    }

    /// Removes a step from the canvas side.
    pub fn remove_step(&mut self, node_id: &NodeId) -> Result<(), GraphError> {
        self.store.remove_node(node_id)?;
        self.pump();
        Ok(())
    }

    /// Deletes a message from the preview side: the projector publishes
    /// `deleteNode`, the store confirms with `deleteMessage`, and both panes
    /// settle through the pump.
    pub fn delete_from_preview(&mut self, message_id: MessageId) {
        self.projector.request_delete(message_id);
        self.pump();
    }

    /// The component editor's path: replaces a message's rendered content.
    pub fn edit_content(&mut self, message_id: MessageId, content: MessageBody) {
        self.channel.publish(FlowEvent::UpdateMessageContent {
            message_id,
            content,
        });
        self.pump();
    }

    // ------------------------------------------------------------------
    // Test mode
    // ------------------------------------------------------------------

    /// Enters test mode at `start_id`; returns whether the controller
    /// activated.
    pub fn enter_test(&mut self, start_id: MessageId) -> bool {
        let entered = self.test.enter(start_id, &self.projector);
        self.pump();
        entered
    }

    /// Exits test mode.
    pub fn exit_test(&mut self) {
        self.test.exit();
        self.pump();
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Captures the current state as a persistable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot::capture(&self.store, &self.projector)
    }

    /// Saves the current state through a storage boundary.
    pub async fn save_to(&self, store: &dyn SnapshotStore) -> Result<(), SnapshotError> {
        store.save(&self.snapshot()).await
    }

    /// Starts the periodic best-effort auto-saver for a shared app.
    pub fn start_autosave(
        app: Arc<Mutex<FlowApp>>,
        store: Arc<dyn SnapshotStore>,
    ) -> ScheduledTask {
        let period = app.lock().unwrap().config.autosave_interval;
        tasks::spawn_autosave(period, store, move || app.lock().unwrap().snapshot())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The transcript as the preview renders it, honoring the test-mode
    /// boundary when active.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry<'_>> {
        if self.test.mode().is_active() {
            self.test.view()
        } else {
            self.projector.view(None)
        }
    }

    #[must_use]
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Direct store access for canvas-driven mutations; call
    /// [`pump`](Self::pump) afterwards to settle the panes.
    pub fn store_mut(&mut self) -> &mut GraphStore {
        &mut self.store
    }

    #[must_use]
    pub fn projector(&self) -> &ConversationProjector {
        &self.projector
    }

    /// Direct projector access for preview-driven interaction signals.
    pub fn projector_mut(&mut self) -> &mut ConversationProjector {
        &mut self.projector
    }

    #[must_use]
    pub fn test_mode(&self) -> &TestModeController {
        &self.test
    }

    pub fn test_mode_mut(&mut self) -> &mut TestModeController {
        &mut self.test
    }

    /// The shared event channel; external collaborators (canvas, component
    /// editor) publish through a clone of this handle.
    #[must_use]
    pub fn channel(&self) -> &EventChannel {
        &self.channel
    }

    #[must_use]
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }
}
