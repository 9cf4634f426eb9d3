//! Ephemeral test-mode replay of a transcript prefix.
//!
//! Test mode lets an author preview the conversation up to a chosen step
//! without mutating the flow. The controller snapshots a prefix of the
//! projector's current transcript on entry and holds it frozen: structural
//! events keep flowing to the main projector in the background, but the test
//! surface does not consume them, so the replay stays exactly as entered
//! until the next `enter`.

use crate::event_bus::{EventChannel, FlowEvent};
use crate::projector::{ConversationProjector, Message, TranscriptEntry};
use crate::types::MessageId;

/// The controller's state machine: `Inactive → Active → Inactive`, nothing
/// else. Carrying the start id inside the variant makes "active but no start
/// message" unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestMode {
    Inactive,
    Active { start_id: MessageId },
}

impl TestMode {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, TestMode::Active { .. })
    }
}

/// Manages entry into and exit from test mode.
///
/// Entering emits [`FlowEvent::EnterTestMode`] so the (external) canvas can
/// dim and suppress interaction; exiting emits [`FlowEvent::ExitTestMode`].
/// The controller never mutates the main order or message list.
///
/// # Examples
///
/// ```
/// use chatloom::event_bus::{EventChannel, FlowEvent};
/// use chatloom::projector::ConversationProjector;
/// use chatloom::testmode::TestModeController;
/// use chatloom::types::{ComponentId, MessageId, UiToolType};
///
/// let channel = EventChannel::new();
/// let mut projector = ConversationProjector::new(channel.clone());
/// for m in ["m1", "m2", "m3"] {
///     projector.apply(&FlowEvent::AddMessage {
///         message_id: MessageId::from(m),
///         component_id: ComponentId::from("c"),
///         ui_tool_type: UiToolType::Question,
///         show_dropdown: false,
///     });
/// }
///
/// let mut test = TestModeController::new(channel);
/// assert!(test.enter(MessageId::from("m2"), &projector));
/// assert_eq!(test.transcript().len(), 2); // [m1, m2], inclusive prefix
/// test.exit();
/// assert!(!test.mode().is_active());
/// ```
pub struct TestModeController {
    mode: TestMode,
    transcript: Vec<Message>,
    input: String,
    channel: EventChannel,
}

impl TestModeController {
    /// Creates an inactive controller publishing on `channel`.
    #[must_use]
    pub fn new(channel: EventChannel) -> Self {
        Self {
            mode: TestMode::Inactive,
            transcript: Vec::new(),
            input: String::new(),
            channel,
        }
    }

    /// Enters test mode at `start_id`, snapshotting the transcript prefix up
    /// to and including it.
    ///
    /// If `start_id` is not in the projector's current order this is a no-op
    /// and returns `false`: the controller keeps whatever state it had.
    /// Re-entering while already active replaces the frozen snapshot.
    pub fn enter(&mut self, start_id: MessageId, projector: &ConversationProjector) -> bool {
        let Some(index) = projector
            .messages()
            .iter()
            .position(|m| m.message_id == start_id)
        else {
            tracing::debug!(%start_id, "enter test mode: id not in transcript; staying put");
            return false;
        };
        self.transcript = projector.messages()[..=index].to_vec();
        self.input.clear();
        self.mode = TestMode::Active {
            start_id: start_id.clone(),
        };
        self.channel.publish(FlowEvent::EnterTestMode {
            message_id: Some(start_id),
        });
        true
    }

    /// Leaves test mode: the frozen transcript is discarded, the input buffer
    /// cleared, and the canvas told to restore interaction. A no-op when
    /// already inactive.
    pub fn exit(&mut self) {
        if !self.mode.is_active() {
            return;
        }
        self.transcript.clear();
        self.input.clear();
        self.mode = TestMode::Inactive;
        self.channel.publish(FlowEvent::ExitTestMode);
    }

    /// The current state.
    #[must_use]
    pub fn mode(&self) -> &TestMode {
        &self.mode
    }

    /// The frozen prefix transcript; empty while inactive.
    #[must_use]
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// The renderable test transcript. The start message is the boundary, so
    /// it gets no response placeholder; the author's test input goes there.
    #[must_use]
    pub fn view(&self) -> Vec<TranscriptEntry<'_>> {
        let boundary = match &self.mode {
            TestMode::Active { start_id } => Some(start_id),
            TestMode::Inactive => None,
        };
        let empty = rustc_hash::FxHashSet::default();
        crate::projector::view_of(&self.transcript, boundary, &empty, &empty, None)
    }

    /// The author's draft test reply.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Updates the draft test reply; ignored while inactive.
    pub fn set_input(&mut self, input: impl Into<String>) {
        if self.mode.is_active() {
            self.input = input.into();
        }
    }
}
