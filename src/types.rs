//! Core identifier and discriminant types for the chatloom engine.
//!
//! This module defines the fundamental types used throughout the system for
//! identifying graph and transcript entities. Every entity id is a string
//! newtype rather than a bare `String` so that a node id can never be passed
//! where a message id is expected.
//!
//! # Key Types
//!
//! - [`NodeId`], [`EdgeId`], [`ComponentId`], [`MessageId`]: entity identifiers
//! - [`Sender`]: which side of the conversation authored a message
//! - [`UiToolType`]: the authoring-tool variant backing a component
//!
//! # Examples
//!
//! ```rust
//! use chatloom::types::{MessageId, UiToolType};
//!
//! let id = MessageId::from("m1");
//! assert_eq!(id.as_str(), "m1");
//!
//! // Fresh ids for newly materialized messages
//! let minted = MessageId::generate();
//! assert!(!minted.as_str().is_empty());
//!
//! let tool = UiToolType::Question;
//! assert_eq!(tool.to_string(), "question");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier string.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Mints a fresh random identifier (UUID v4).
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Borrows the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifies a node on the canvas graph.
    NodeId
);
string_id!(
    /// Identifies a directed edge between two nodes.
    EdgeId
);
string_id!(
    /// Identifies an authored component (the opaque editor payload).
    ComponentId
);
string_id!(
    /// The stable cross-reference key shared between a node and its message.
    ///
    /// This is the identity that survives reorders: the graph side and the
    /// preview side both address a conversational step by its `MessageId`.
    MessageId
);

/// Which side of the conversation authored a message.
///
/// Authored flow steps are always [`Sender::Ai`]; the user side appears in a
/// transcript only as the synthetic response placeholder, which is a rendering
/// rule rather than a stored message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Ai => write!(f, "ai"),
        }
    }
}

/// The authoring-tool variant backing a component.
///
/// The engine never interprets component content; the tool type is only used
/// to pick the default [`MessageBody`](crate::projector::MessageBody) variant
/// when a message first materializes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UiToolType {
    /// A question the flow asks; renders as a plain text bubble.
    Question,
    /// A standalone statement; renders as a card.
    Message,
    /// A multiple-choice prompt; renders as selectable pills.
    MultiSelect,
}

impl fmt::Display for UiToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Question => write!(f, "question"),
            Self::Message => write!(f, "message"),
            Self::MultiSelect => write!(f, "multiSelect"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trips_through_serde_transparently() {
        let id = MessageId::from("m-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"m-42\"");
        let back: MessageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(NodeId::generate(), NodeId::generate());
    }

    #[test]
    fn tool_type_uses_camel_case_wire_names() {
        let json = serde_json::to_string(&UiToolType::MultiSelect).unwrap();
        assert_eq!(json, "\"multiSelect\"");
    }
}
