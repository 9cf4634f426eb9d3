use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::projector::MessageBody;
use crate::types::{ComponentId, MessageId, UiToolType};

/// The typed vocabulary of the event channel.
///
/// Every event carries a discriminated payload tagged by kind. The serde
/// representation matches the wire names used between the canvas and the
/// preview (`{"event": "syncMessageOrder", "payload": {...}}`), so captured
/// event logs are directly inspectable.
///
/// Publisher/consumer pairs:
///
/// - topology → preview: [`SyncMessageOrder`](Self::SyncMessageOrder),
///   [`AddMessage`](Self::AddMessage), [`UpdateMessage`](Self::UpdateMessage),
///   [`UpdateMessageContent`](Self::UpdateMessageContent),
///   [`UpdateComponentData`](Self::UpdateComponentData)
/// - either pane → both panes: [`DeleteMessage`](Self::DeleteMessage)
/// - preview → canvas: [`DeleteNode`](Self::DeleteNode),
///   [`SelectNode`](Self::SelectNode), [`HighlightNode`](Self::HighlightNode),
///   [`UnhighlightNode`](Self::UnhighlightNode),
///   [`OpenEditWindow`](Self::OpenEditWindow)
/// - canvas → preview: [`NodeSelection`](Self::NodeSelection),
///   [`HighlightMessage`](Self::HighlightMessage),
///   [`UnhighlightMessage`](Self::UnhighlightMessage),
///   [`ScrollToMessage`](Self::ScrollToMessage)
/// - test controller → canvas: [`EnterTestMode`](Self::EnterTestMode),
///   [`ExitTestMode`](Self::ExitTestMode)
///
/// # Example
///
/// ```
/// use chatloom::event_bus::FlowEvent;
/// use chatloom::types::MessageId;
///
/// let event = FlowEvent::delete_one(MessageId::from("m2"));
/// let json = serde_json::to_value(&event).unwrap();
/// assert_eq!(json["event"], "deleteMessage");
/// assert_eq!(json["payload"]["messageIds"][0], "m2");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "event",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum FlowEvent {
    /// The resolved linear order and orphan set for the whole graph.
    SyncMessageOrder {
        order: Vec<MessageId>,
        orphan_ids: Vec<MessageId>,
    },
    /// A node gained a message id; the preview should materialize it.
    AddMessage {
        message_id: MessageId,
        component_id: ComponentId,
        ui_tool_type: UiToolType,
        show_dropdown: bool,
    },
    /// Tool type or dropdown affordance of an existing message changed.
    UpdateMessage {
        message_id: MessageId,
        ui_tool_type: UiToolType,
        show_dropdown: bool,
    },
    /// Authored content of an existing message changed.
    UpdateMessageContent {
        message_id: MessageId,
        content: MessageBody,
    },
    /// Opaque component payload attached to a message changed.
    UpdateComponentData {
        message_id: MessageId,
        component_data: Value,
    },
    /// Remove the listed messages; a single delete is a one-element batch.
    DeleteMessage { message_ids: Vec<MessageId> },
    /// The preview asks the graph side to delete the node owning a message.
    DeleteNode { message_id: MessageId },
    /// The canvas selection changed; the preview mirrors it.
    NodeSelection { selected_message_ids: Vec<MessageId> },
    /// A preview bubble was clicked; the canvas should select its node.
    SelectNode { message_id: MessageId },
    /// Hover entered a preview bubble; the canvas highlights its node.
    HighlightNode { message_id: MessageId },
    /// Hover left a preview bubble.
    UnhighlightNode { message_id: MessageId },
    /// Hover entered a canvas node; the preview highlights its bubble.
    HighlightMessage { message_id: MessageId },
    /// Hover left a canvas node.
    UnhighlightMessage { message_id: MessageId },
    /// The canvas asks the preview to scroll a bubble into view.
    ScrollToMessage { message_id: MessageId },
    /// Test mode started; the canvas dims and suppresses interaction.
    EnterTestMode { message_id: Option<MessageId> },
    /// Test mode ended; the canvas restores interaction.
    ExitTestMode,
    /// The preview asks the canvas to open the component editor.
    OpenEditWindow { message_id: MessageId },
}

impl FlowEvent {
    /// Builds a [`SyncMessageOrder`](Self::SyncMessageOrder) event.
    pub fn sync_order(order: Vec<MessageId>, orphan_ids: Vec<MessageId>) -> Self {
        FlowEvent::SyncMessageOrder { order, orphan_ids }
    }

    /// Builds a single-message [`DeleteMessage`](Self::DeleteMessage) batch.
    pub fn delete_one(message_id: MessageId) -> Self {
        FlowEvent::DeleteMessage {
            message_ids: vec![message_id],
        }
    }

    /// The wire tag of this event kind, as it appears in serialized form.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            FlowEvent::SyncMessageOrder { .. } => "syncMessageOrder",
            FlowEvent::AddMessage { .. } => "addMessage",
            FlowEvent::UpdateMessage { .. } => "updateMessage",
            FlowEvent::UpdateMessageContent { .. } => "updateMessageContent",
            FlowEvent::UpdateComponentData { .. } => "updateComponentData",
            FlowEvent::DeleteMessage { .. } => "deleteMessage",
            FlowEvent::DeleteNode { .. } => "deleteNode",
            FlowEvent::NodeSelection { .. } => "nodeSelection",
            FlowEvent::SelectNode { .. } => "selectNode",
            FlowEvent::HighlightNode { .. } => "highlightNode",
            FlowEvent::UnhighlightNode { .. } => "unhighlightNode",
            FlowEvent::HighlightMessage { .. } => "highlightMessage",
            FlowEvent::UnhighlightMessage { .. } => "unhighlightMessage",
            FlowEvent::ScrollToMessage { .. } => "scrollToMessage",
            FlowEvent::EnterTestMode { .. } => "enterTestMode",
            FlowEvent::ExitTestMode => "exitTestMode",
            FlowEvent::OpenEditWindow { .. } => "openEditWindow",
        }
    }

    /// True for events that change transcript structure rather than
    /// presentation state. The test-mode surface freezes across these.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            FlowEvent::SyncMessageOrder { .. }
                | FlowEvent::AddMessage { .. }
                | FlowEvent::DeleteMessage { .. }
                | FlowEvent::NodeSelection { .. }
        )
    }

    /// Convert the event to a compact JSON string.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for FlowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowEvent::SyncMessageOrder { order, orphan_ids } => write!(
                f,
                "[syncMessageOrder] {} message(s), {} orphan(s)",
                order.len(),
                orphan_ids.len()
            ),
            FlowEvent::DeleteMessage { message_ids } => {
                write!(f, "[deleteMessage] {} message(s)", message_ids.len())
            }
            FlowEvent::NodeSelection {
                selected_message_ids,
            } => write!(f, "[nodeSelection] {} selected", selected_message_ids.len()),
            FlowEvent::EnterTestMode { message_id } => match message_id {
                Some(id) => write!(f, "[enterTestMode] from {id}"),
                None => write!(f, "[enterTestMode]"),
            },
            FlowEvent::ExitTestMode => write!(f, "[exitTestMode]"),
            FlowEvent::AddMessage {
                message_id,
                ui_tool_type,
                ..
            } => write!(f, "[addMessage] {message_id} ({ui_tool_type})"),
            FlowEvent::UpdateMessage { message_id, .. }
            | FlowEvent::UpdateMessageContent { message_id, .. }
            | FlowEvent::UpdateComponentData { message_id, .. }
            | FlowEvent::DeleteNode { message_id }
            | FlowEvent::SelectNode { message_id }
            | FlowEvent::HighlightNode { message_id }
            | FlowEvent::UnhighlightNode { message_id }
            | FlowEvent::HighlightMessage { message_id }
            | FlowEvent::UnhighlightMessage { message_id }
            | FlowEvent::ScrollToMessage { message_id }
            | FlowEvent::OpenEditWindow { message_id } => {
                write!(f, "[{}] {message_id}", self.kind())
            }
        }
    }
}
