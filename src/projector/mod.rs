//! The preview-side transcript projection.
//!
//! [`ConversationProjector`] owns the ordered message list the chat preview
//! renders. It never touches graph topology: everything it knows arrives as
//! [`FlowEvent`]s, and everything it wants from the canvas side leaves as
//! events too. The list is rebuilt, not replaced, on each sync: identity by
//! `message_id` is preserved across reorders so in-flight UI state survives.

pub mod message;

pub use message::{Message, MessageBody, TranscriptEntry};

use rustc_hash::FxHashSet;

use crate::event_bus::{EventChannel, FlowEvent};
use crate::types::MessageId;

/// Reconciles order/content events into an ordered, renderable transcript and
/// mirrors selection/highlight state from the canvas.
///
/// All list mutations are atomic snapshot replacements; no reader ever
/// observes a torn intermediate list. Unknown message ids in update, select,
/// and delete events are silent no-ops, since events may legitimately race
/// with deletions.
///
/// # Examples
///
/// ```
/// use chatloom::event_bus::{EventChannel, FlowEvent};
/// use chatloom::projector::ConversationProjector;
/// use chatloom::types::{ComponentId, MessageId, UiToolType};
///
/// let mut projector = ConversationProjector::new(EventChannel::new());
/// projector.apply(&FlowEvent::AddMessage {
///     message_id: MessageId::from("m1"),
///     component_id: ComponentId::from("c1"),
///     ui_tool_type: UiToolType::Question,
///     show_dropdown: false,
/// });
/// assert_eq!(projector.len(), 1);
/// ```
pub struct ConversationProjector {
    messages: Vec<Message>,
    orphans: FxHashSet<MessageId>,
    selection: FxHashSet<MessageId>,
    highlighted: Option<MessageId>,
    scroll_target: Option<MessageId>,
    channel: EventChannel,
}

impl ConversationProjector {
    /// Creates an empty projector publishing its interaction signals on
    /// `channel`.
    #[must_use]
    pub fn new(channel: EventChannel) -> Self {
        Self {
            messages: Vec::new(),
            orphans: FxHashSet::default(),
            selection: FxHashSet::default(),
            highlighted: None,
            scroll_target: None,
            channel,
        }
    }

    /// Rebuilds a projector from persisted messages without publishing.
    pub(crate) fn from_parts(
        messages: Vec<Message>,
        orphans: FxHashSet<MessageId>,
        channel: EventChannel,
    ) -> Self {
        Self {
            messages,
            orphans,
            selection: FxHashSet::default(),
            highlighted: None,
            scroll_target: None,
            channel,
        }
    }

    // ------------------------------------------------------------------
    // Event consumption
    // ------------------------------------------------------------------

    /// Reacts to the events this pane consumes; everything else is ignored.
    pub fn apply(&mut self, event: &FlowEvent) {
        match event {
            FlowEvent::SyncMessageOrder { order, orphan_ids } => {
                self.reconcile(order, orphan_ids);
            }
            FlowEvent::AddMessage {
                message_id,
                component_id,
                ui_tool_type,
                show_dropdown,
            } => {
                if self.find(message_id).is_some() {
                    tracing::debug!(%message_id, "addMessage for existing message; ignoring");
                    return;
                }
                let local_id = self.messages.iter().map(|m| m.id).max().unwrap_or(0) + 1;
                self.messages.push(Message::materialize(
                    local_id,
                    message_id.clone(),
                    component_id.clone(),
                    *ui_tool_type,
                    *show_dropdown,
                ));
            }
            FlowEvent::UpdateMessage {
                message_id,
                ui_tool_type,
                show_dropdown,
            } => {
                if let Some(message) = self.find_mut(message_id) {
                    message.show_dropdown = *show_dropdown;
                    if !message.body.matches_tool(*ui_tool_type) {
                        message.body = MessageBody::for_tool(*ui_tool_type);
                    }
                }
            }
            FlowEvent::UpdateMessageContent {
                message_id,
                content,
            } => {
                if let Some(message) = self.find_mut(message_id) {
                    message.body = content.clone();
                }
            }
            FlowEvent::UpdateComponentData {
                message_id,
                component_data,
            } => {
                if let Some(message) = self.find_mut(message_id) {
                    message.component_data = component_data.clone();
                }
            }
            FlowEvent::DeleteMessage { message_ids } => {
                self.delete(message_ids);
            }
            FlowEvent::NodeSelection {
                selected_message_ids,
            } => {
                self.selection = selected_message_ids.iter().cloned().collect();
            }
            FlowEvent::HighlightMessage { message_id } => {
                self.highlighted = Some(message_id.clone());
            }
            FlowEvent::UnhighlightMessage { message_id } => {
                // Last write wins: a stale unhighlight must not clobber a
                // newer highlight of a different message.
                if self.highlighted.as_ref() == Some(message_id) {
                    self.highlighted = None;
                }
            }
            FlowEvent::ScrollToMessage { message_id } => {
                self.scroll_target = Some(message_id.clone());
            }
            _ => {}
        }
    }

    /// Rebuilds the list against a freshly resolved order.
    ///
    /// Ids in `order` with no message yet are skipped (their `addMessage` is
    /// still in flight). Messages absent from `order` are appended at the end
    /// in their previous relative order; the projector never drops data
    /// silently, even if the resolver contract says this cannot happen.
    fn reconcile(&mut self, order: &[MessageId], orphan_ids: &[MessageId]) {
        let previous = std::mem::take(&mut self.messages);
        let previous_ids: Vec<MessageId> = previous.iter().map(|m| m.message_id.clone()).collect();
        let mut lookup: rustc_hash::FxHashMap<MessageId, Message> = previous
            .into_iter()
            .map(|m| (m.message_id.clone(), m))
            .collect();

        let mut next: Vec<Message> = Vec::with_capacity(lookup.len());
        for id in order {
            if let Some(message) = lookup.remove(id) {
                next.push(message);
            }
        }
        for id in &previous_ids {
            if let Some(message) = lookup.remove(id) {
                tracing::warn!(message_id = %id, "message missing from resolved order; keeping at tail");
                next.push(message);
            }
        }

        self.messages = next;
        self.orphans = orphan_ids.iter().cloned().collect();
    }

    /// Removes all entries in `ids` in one atomic list replacement, keeping
    /// survivor order untouched. Absent ids are no-ops.
    fn delete(&mut self, ids: &[MessageId]) {
        let doomed: FxHashSet<&MessageId> = ids.iter().collect();
        let previous = std::mem::take(&mut self.messages);
        self.messages = previous
            .into_iter()
            .filter(|m| !doomed.contains(&m.message_id))
            .collect();
        self.orphans.retain(|id| !doomed.contains(id));
        self.selection.retain(|id| !doomed.contains(id));
        if let Some(h) = &self.highlighted {
            if doomed.contains(h) {
                self.highlighted = None;
            }
        }
        if let Some(s) = &self.scroll_target {
            if doomed.contains(s) {
                self.scroll_target = None;
            }
        }
    }

    // ------------------------------------------------------------------
    // Interaction signals (preview → canvas)
    // ------------------------------------------------------------------

    /// Asks the graph side to delete the node owning this message. The local
    /// entry is removed only once the store confirms with `deleteMessage`.
    pub fn request_delete(&self, message_id: MessageId) {
        self.channel.publish(FlowEvent::DeleteNode { message_id });
    }

    /// A preview bubble was clicked; the canvas selects its node.
    pub fn select(&self, message_id: MessageId) {
        self.channel.publish(FlowEvent::SelectNode { message_id });
    }

    /// Hover entered a preview bubble.
    pub fn hover_enter(&self, message_id: MessageId) {
        self.channel.publish(FlowEvent::HighlightNode { message_id });
    }

    /// Hover left a preview bubble.
    pub fn hover_leave(&self, message_id: MessageId) {
        self.channel
            .publish(FlowEvent::UnhighlightNode { message_id });
    }

    /// Asks the canvas to open the component editor for this message.
    pub fn open_editor(&self, message_id: MessageId) {
        self.channel
            .publish(FlowEvent::OpenEditWindow { message_id });
    }

    // ------------------------------------------------------------------
    // Views and accessors
    // ------------------------------------------------------------------

    /// The renderable transcript, with the synthetic response placeholder
    /// after every AI-authored message except `boundary` (the active
    /// test-mode start message, if any).
    #[must_use]
    pub fn view(&self, boundary: Option<&MessageId>) -> Vec<TranscriptEntry<'_>> {
        view_of(
            &self.messages,
            boundary,
            &self.orphans,
            &self.selection,
            self.highlighted.as_ref(),
        )
    }

    /// Messages in transcript order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The current order as message ids.
    pub fn order(&self) -> impl Iterator<Item = &MessageId> {
        self.messages.iter().map(|m| &m.message_id)
    }

    #[must_use]
    pub fn find(&self, message_id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.message_id == message_id)
    }

    fn find_mut(&mut self, message_id: &MessageId) -> Option<&mut Message> {
        self.messages
            .iter_mut()
            .find(|m| &m.message_id == message_id)
    }

    #[must_use]
    pub fn is_orphan(&self, message_id: &MessageId) -> bool {
        self.orphans.contains(message_id)
    }

    /// Orphan flags, purely presentational.
    #[must_use]
    pub fn orphans(&self) -> &FxHashSet<MessageId> {
        &self.orphans
    }

    /// The mirrored canvas selection.
    #[must_use]
    pub fn selection(&self) -> &FxHashSet<MessageId> {
        &self.selection
    }

    #[must_use]
    pub fn highlighted(&self) -> Option<&MessageId> {
        self.highlighted.as_ref()
    }

    /// Takes the pending scroll target, if any; the (external) renderer
    /// consumes this to drive its scroll animation.
    pub fn take_scroll_target(&mut self) -> Option<MessageId> {
        self.scroll_target.take()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Shared placeholder-interleaving rule, also used by the test-mode surface
/// on its frozen transcript copy.
pub(crate) fn view_of<'a>(
    messages: &'a [Message],
    boundary: Option<&MessageId>,
    orphans: &FxHashSet<MessageId>,
    selection: &FxHashSet<MessageId>,
    highlighted: Option<&MessageId>,
) -> Vec<TranscriptEntry<'a>> {
    let mut entries = Vec::with_capacity(messages.len() * 2);
    for message in messages {
        entries.push(TranscriptEntry::Message {
            message,
            orphan: orphans.contains(&message.message_id),
            selected: selection.contains(&message.message_id),
            highlighted: highlighted == Some(&message.message_id),
        });
        let is_boundary = boundary == Some(&message.message_id);
        if message.sender == crate::types::Sender::Ai && !is_boundary {
            entries.push(TranscriptEntry::ResponsePlaceholder {
                after: &message.message_id,
            });
        }
    }
    entries
}
