use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ComponentId, MessageId, Sender, UiToolType};

/// The renderable body of a transcript message.
///
/// Each variant carries only its own fields and is dispatched by exhaustive
/// matching; there is no optional-field probing on a type string. The serde
/// tag matches the preview wire format (`text` / `card` / `pills`).
///
/// # Examples
///
/// ```
/// use chatloom::projector::MessageBody;
///
/// let body = MessageBody::Pills {
///     options: vec!["Yes".into(), "No".into()],
/// };
/// let json = serde_json::to_value(&body).unwrap();
/// assert_eq!(json["type"], "pills");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageBody {
    /// A plain chat bubble.
    Text { text: String },
    /// A titled card.
    Card { title: String, text: String },
    /// Selectable answer pills.
    Pills { options: Vec<String> },
}

impl MessageBody {
    /// The empty default body for a freshly materialized message, chosen by
    /// its component's tool type: question → text, message → card,
    /// multiSelect → pills.
    #[must_use]
    pub fn for_tool(tool: UiToolType) -> Self {
        match tool {
            UiToolType::Question => MessageBody::Text {
                text: String::new(),
            },
            UiToolType::Message => MessageBody::Card {
                title: String::new(),
                text: String::new(),
            },
            UiToolType::MultiSelect => MessageBody::Pills {
                options: Vec::new(),
            },
        }
    }

    /// True when this body matches the default variant for `tool`.
    #[must_use]
    pub fn matches_tool(&self, tool: UiToolType) -> bool {
        matches!(
            (self, tool),
            (MessageBody::Text { .. }, UiToolType::Question)
                | (MessageBody::Card { .. }, UiToolType::Message)
                | (MessageBody::Pills { .. }, UiToolType::MultiSelect)
        )
    }
}

/// One entry of the preview transcript.
///
/// `message_id` is the stable cross-reference key shared with the owning
/// graph node; `id` is the projector's own list identity, assigned once at
/// materialization and stable across reorders so in-flight UI state (hover,
/// selection, focus) survives a re-sync.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Local sequence key; unique within one projector's list.
    pub id: u64,
    pub message_id: MessageId,
    pub component_id: ComponentId,
    pub sender: Sender,
    #[serde(flatten)]
    pub body: MessageBody,
    #[serde(default)]
    pub show_dropdown: bool,
    /// Opaque component payload, forwarded but never interpreted.
    #[serde(default)]
    pub component_data: Value,
}

impl Message {
    /// Materializes a message for a node that just gained its message id.
    #[must_use]
    pub fn materialize(
        id: u64,
        message_id: MessageId,
        component_id: ComponentId,
        tool: UiToolType,
        show_dropdown: bool,
    ) -> Self {
        Self {
            id,
            message_id,
            component_id,
            sender: Sender::Ai,
            body: MessageBody::for_tool(tool),
            show_dropdown,
            component_data: Value::Null,
        }
    }
}

/// One renderable row of a transcript view.
///
/// The synthetic response placeholder is a rendering rule, not a stored
/// entity: it follows every AI-authored message except the active test-mode
/// boundary, and carries no message id of its own.
#[derive(Clone, Debug, PartialEq)]
pub enum TranscriptEntry<'a> {
    Message {
        message: &'a Message,
        orphan: bool,
        selected: bool,
        highlighted: bool,
    },
    /// Where the user's answer would go, right after `after`.
    ResponsePlaceholder { after: &'a MessageId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bodies_follow_tool_types() {
        assert!(MessageBody::for_tool(UiToolType::Question).matches_tool(UiToolType::Question));
        assert!(MessageBody::for_tool(UiToolType::Message).matches_tool(UiToolType::Message));
        assert!(
            MessageBody::for_tool(UiToolType::MultiSelect).matches_tool(UiToolType::MultiSelect)
        );
        assert!(!MessageBody::for_tool(UiToolType::Question).matches_tool(UiToolType::Message));
    }

    #[test]
    fn message_serializes_with_flattened_body_tag() {
        let message = Message::materialize(
            1,
            MessageId::from("m1"),
            ComponentId::from("c1"),
            UiToolType::Question,
            false,
        );
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["sender"], "ai");
        assert_eq!(json["messageId"], "m1");
    }
}
